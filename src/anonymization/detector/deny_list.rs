//! Deny-list recognizer
//!
//! Reports whole-word occurrences of a fixed list of values, for deployments
//! that know the names to hide but run without an NER model.

use super::Recognizer;
use crate::anonymization::models::{EntityType, Span};
use crate::domain::{CloakError, Result};
use regex::{Regex, RegexBuilder};

/// Recognizer for a configured list of values
pub struct DenyListRecognizer {
    name: String,
    pattern: Option<Regex>,
    entity_type: EntityType,
    score: f32,
}

impl DenyListRecognizer {
    /// Build a recognizer for `values`
    ///
    /// Longer values are tried first, so "Acme Corp" wins over "Acme".
    pub fn new(
        entity_type: EntityType,
        values: &[String],
        case_sensitive: bool,
        score: f32,
    ) -> Result<Self> {
        let mut values: Vec<&str> = values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        values.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        values.dedup();

        let pattern = if values.is_empty() {
            None
        } else {
            let alternation = values
                .iter()
                .map(|v| regex::escape(v))
                .collect::<Vec<_>>()
                .join("|");
            let regex = RegexBuilder::new(&format!("(?:{alternation})"))
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| {
                    CloakError::Configuration(format!(
                        "Invalid deny list for {entity_type}: {e}"
                    ))
                })?;
            Some(regex)
        };

        Ok(Self {
            name: format!("deny_list:{entity_type}"),
            pattern,
            entity_type,
            score,
        })
    }

    fn is_word_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Whether `start..end` is not glued to surrounding word characters
    fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.is_some_and(Self::is_word_char) && !after.is_some_and(Self::is_word_char)
    }
}

impl Recognizer for DenyListRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        vec![self.entity_type.clone()]
    }

    fn analyze(&self, text: &str, _language: &str) -> Result<Vec<Span>> {
        let Some(pattern) = &self.pattern else {
            return Ok(Vec::new());
        };

        let mut spans = Vec::new();
        let mut from = 0;
        // find_at instead of find_iter: a rejected match must not hide a later one
        while let Some(m) = pattern.find_at(text, from) {
            if Self::is_whole_word(text, m.start(), m.end()) {
                spans.push(Span::new(
                    m.start(),
                    m.end(),
                    self.entity_type.clone(),
                    self.score,
                ));
                from = m.end();
            } else {
                from = match text[m.start()..].chars().next() {
                    Some(c) => m.start() + c.len_utf8(),
                    None => break,
                };
            }
            if from >= text.len() {
                break;
            }
        }

        Ok(spans)
    }
}
