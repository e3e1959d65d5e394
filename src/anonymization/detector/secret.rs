//! Random secret recognizer
//!
//! Flags password- and API-key-like tokens by how many character classes they
//! mix. Plain words are never reported: a candidate needs a digit or a symbol.

use super::Recognizer;
use crate::anonymization::models::{kinds, EntityType, Span};
use crate::domain::{CloakError, Result};
use regex::Regex;

/// Symbols counted as their own character class
pub const SECRET_SYMBOLS: &str = "!@#$%^&*()-_=+";

/// Default minimum candidate length
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Score for candidates mixing three or more character classes
pub const HIGH_CONFIDENCE: f32 = 0.99;

/// Score for two-class candidates that include a digit or a symbol
pub const MEDIUM_CONFIDENCE: f32 = 0.85;

/// Recognizer for `RANDOM_SECRET`
pub struct RandomSecretRecognizer {
    candidate: Regex,
    entity_type: EntityType,
}

impl RandomSecretRecognizer {
    /// Create a recognizer with the default minimum length
    pub fn new() -> Result<Self> {
        Self::with_min_length(DEFAULT_MIN_LENGTH)
    }

    /// Create a recognizer reporting candidates of at least `min_length` chars
    pub fn with_min_length(min_length: usize) -> Result<Self> {
        if min_length == 0 {
            return Err(CloakError::Configuration(
                "Random secret minimum length must be at least 1".to_string(),
            ));
        }
        // Maximal runs of word characters and secret symbols
        let candidate = Regex::new(&format!(r"[\w!@#$%^\&*()\-=+]{{{min_length},}}"))
            .map_err(|e| CloakError::Configuration(format!("Invalid secret pattern: {e}")))?;

        Ok(Self {
            candidate,
            entity_type: EntityType::new(kinds::RANDOM_SECRET)?,
        })
    }

    /// Confidence for a candidate, `None` when it does not look random enough
    pub fn estimate_confidence(value: &str) -> Option<f32> {
        let lower = value.chars().any(|c| c.is_lowercase());
        let upper = value.chars().any(|c| c.is_uppercase());
        let digit = value.chars().any(|c| c.is_ascii_digit());
        let symbol = value.chars().any(|c| SECRET_SYMBOLS.contains(c));

        let classes = [lower, upper, digit, symbol]
            .iter()
            .filter(|present| **present)
            .count();

        if classes >= 3 {
            Some(HIGH_CONFIDENCE)
        } else if classes == 2 && (digit || symbol) {
            Some(MEDIUM_CONFIDENCE)
        } else {
            None
        }
    }
}

impl Recognizer for RandomSecretRecognizer {
    fn name(&self) -> &str {
        "random_secret"
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        vec![self.entity_type.clone()]
    }

    fn analyze(&self, text: &str, _language: &str) -> Result<Vec<Span>> {
        Ok(self
            .candidate
            .find_iter(text)
            .filter_map(|m| {
                Self::estimate_confidence(m.as_str())
                    .map(|score| Span::new(m.start(), m.end(), self.entity_type.clone(), score))
            })
            .collect())
    }
}
