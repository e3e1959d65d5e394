//! Detected span model

use super::entity::EntityType;
use crate::domain::{CloakError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A detected PII occurrence in a piece of text
///
/// `start` and `end` are UTF-8 byte offsets into the text the span was detected
/// in, `start` inclusive and `end` exclusive. Both must fall on char boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Entity type of the detected value
    pub entity_type: EntityType,
    /// Detector confidence (0.0 - 1.0)
    pub score: f32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, entity_type: EntityType, score: f32) -> Self {
        Self {
            start,
            end,
            entity_type,
            score,
        }
    }

    /// Create a span from character offsets
    ///
    /// External recognizers (NER services in particular) usually report
    /// character offsets rather than byte offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidInput`] if the offsets do not describe a
    /// non-empty range inside `text`.
    pub fn from_char_offsets(
        text: &str,
        start_char: usize,
        end_char: usize,
        entity_type: EntityType,
        score: f32,
    ) -> Result<Self> {
        let char_count = text.chars().count();
        if start_char >= end_char || end_char > char_count {
            return Err(CloakError::InvalidInput(format!(
                "Invalid character range {start_char}..{end_char} for text of {char_count} characters"
            )));
        }

        let byte_at = |char_idx: usize| {
            text.char_indices()
                .nth(char_idx)
                .map(|(b, _)| b)
                .unwrap_or(text.len())
        };

        Ok(Self::new(
            byte_at(start_char),
            byte_at(end_char),
            entity_type,
            score,
        ))
    }

    /// Parse spans reported by an external detector as JSON
    ///
    /// Accepts an array of objects with `start`, `end`, `entity_type` and
    /// `score` fields. Any missing or mistyped field is a contract violation.
    pub fn parse_many(value: &Value) -> Result<Vec<Span>> {
        serde_json::from_value(value.clone())
            .map_err(|e| CloakError::InvalidInput(format!("Malformed detector output: {e}")))
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check the span against the text it claims to describe
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidInput`] unless `start < end <= text.len()`,
    /// both offsets are char boundaries, and the score is a finite number.
    pub fn validate(&self, text: &str) -> Result<()> {
        if self.start >= self.end {
            return Err(CloakError::InvalidInput(format!(
                "Empty or inverted span {}..{} ({})",
                self.start, self.end, self.entity_type
            )));
        }
        if self.end > text.len() {
            return Err(CloakError::InvalidInput(format!(
                "Span {}..{} ({}) exceeds text length {}",
                self.start,
                self.end,
                self.entity_type,
                text.len()
            )));
        }
        if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            return Err(CloakError::InvalidInput(format!(
                "Span {}..{} ({}) does not fall on character boundaries",
                self.start, self.end, self.entity_type
            )));
        }
        if !self.score.is_finite() {
            return Err(CloakError::InvalidInput(format!(
                "Span {}..{} ({}) has a non-finite score",
                self.start, self.end, self.entity_type
            )));
        }
        Ok(())
    }

    /// The real value the span covers
    ///
    /// Only call this on a span that passed [`Span::validate`] for `text`.
    pub fn value<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}
