//! Substitution records and engine statistics

use super::entity::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One replacement applied to a piece of text
///
/// `start`/`end` are byte offsets of the label in the *labeled* text, so a
/// record can be replayed against exactly the text it was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionItem {
    /// Start of the label in the labeled text
    pub start: usize,
    /// End of the label in the labeled text
    pub end: usize,
    /// Entity type of the replaced value
    pub entity_type: EntityType,
    /// The text that replaced the real value
    pub label: String,
    /// Detector confidence of the replaced span
    pub score: f32,
    /// Strategy that produced the label (`counter`, `hash`, `redact`)
    pub operator: String,
}

/// Result of anonymizing a single string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedText {
    /// Labeled text
    pub text: String,
    /// Replacements applied, in order of appearance
    pub items: Vec<SubstitutionItem>,
}

impl AnonymizedText {
    /// A result with nothing substituted
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            items: Vec::new(),
        }
    }

    /// Whether any replacement happened
    pub fn has_substitutions(&self) -> bool {
        !self.items.is_empty()
    }

    /// Number of replacements per entity type
    pub fn counts_by_entity_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.entity_type.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Running counters for one engine instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationStats {
    /// Spans returned by the detector
    pub spans_detected: usize,
    /// Spans dropped because they overlapped an earlier, longer span
    pub overlaps_discarded: usize,
    /// Replacements applied
    pub substitutions: usize,
    /// Labels turned back into real values
    pub tokens_restored: usize,
    /// Label-shaped tokens with no mapping, left verbatim
    pub unknown_tokens: usize,
    /// Replacements per entity type
    pub by_entity_type: BTreeMap<String, usize>,
}

impl AnonymizationStats {
    /// Fold the result of one substitution pass into the totals
    pub(crate) fn record_pass(
        &mut self,
        detected: usize,
        discarded: usize,
        result: &AnonymizedText,
    ) {
        self.spans_detected += detected;
        self.overlaps_discarded += discarded;
        self.substitutions += result.items.len();
        for (entity_type, count) in result.counts_by_entity_type() {
            *self.by_entity_type.entry(entity_type).or_insert(0) += count;
        }
    }
}
