//! Account handle recognizer
//!
//! Reports tokens that mix letters and digits (`user123`, `jdoe42`). On their
//! own these are weak evidence; a nearby context word such as "username" or
//! "login" raises the score.

use super::Recognizer;
use crate::anonymization::models::{kinds, EntityType, Span};
use crate::domain::{CloakError, Result};
use regex::Regex;

/// Default minimum token length
pub const DEFAULT_MIN_LENGTH: usize = 5;

/// Score without supporting context
pub const BASE_SCORE: f32 = 0.6;

/// Score when a context keyword precedes the token
pub const CONTEXT_SCORE: f32 = 0.9;

/// Number of preceding words searched for a context keyword
const CONTEXT_WINDOW: usize = 3;

/// Default context keywords
pub fn default_keywords() -> Vec<String> {
    ["user", "username", "login", "handle", "account", "id"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Recognizer for `USERNAME`
pub struct AccountHandleRecognizer {
    token: Regex,
    min_length: usize,
    keywords: Vec<String>,
    entity_type: EntityType,
}

impl AccountHandleRecognizer {
    /// Create a recognizer with the default keywords and minimum length
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_MIN_LENGTH, default_keywords())
    }

    /// Create a recognizer with explicit settings
    pub fn with_settings(min_length: usize, keywords: Vec<String>) -> Result<Self> {
        let token = Regex::new(r"\b[A-Za-z0-9_]+\b")
            .map_err(|e| CloakError::Configuration(format!("Invalid handle pattern: {e}")))?;

        Ok(Self {
            token,
            min_length,
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            entity_type: EntityType::new(kinds::USERNAME)?,
        })
    }

    fn looks_like_handle(token: &str, min_length: usize) -> bool {
        token.len() >= min_length
            && token.chars().any(|c| c.is_ascii_alphabetic())
            && token.chars().any(|c| c.is_ascii_digit())
    }

    /// Whether one of the words just before `start` is a context keyword
    fn has_context(&self, text: &str, start: usize) -> bool {
        text[..start]
            .split_whitespace()
            .rev()
            .take(CONTEXT_WINDOW)
            .map(|word| {
                word.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .any(|word| self.keywords.iter().any(|k| *k == word))
    }
}

impl Recognizer for AccountHandleRecognizer {
    fn name(&self) -> &str {
        "account_handle"
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        vec![self.entity_type.clone()]
    }

    fn analyze(&self, text: &str, _language: &str) -> Result<Vec<Span>> {
        Ok(self
            .token
            .find_iter(text)
            .filter(|m| Self::looks_like_handle(m.as_str(), self.min_length))
            .map(|m| {
                let score = if self.has_context(text, m.start()) {
                    CONTEXT_SCORE
                } else {
                    BASE_SCORE
                };
                Span::new(m.start(), m.end(), self.entity_type.clone(), score)
            })
            .collect())
    }
}
