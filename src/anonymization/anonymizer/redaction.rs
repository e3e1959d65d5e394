//! Redaction strategy

use super::Anonymizer;
use crate::anonymization::mapping::EntityMappingStore;
use crate::anonymization::models::EntityType;
use crate::anonymization::ordering::OrderingHint;

/// Redaction strategy - replaces PII with `<ENTITY_TYPE>` and forgets it
///
/// Nothing is recorded, so redacted values never come back on the return path.
pub struct RedactionStrategy;

impl RedactionStrategy {
    /// Create a new redaction strategy
    pub fn new() -> Self {
        Self
    }
}

impl Anonymizer for RedactionStrategy {
    fn anonymize(
        &mut self,
        _store: &mut EntityMappingStore,
        entity_type: &EntityType,
        _value: &str,
        _hint: &OrderingHint,
    ) -> String {
        format!("<{entity_type}>")
    }

    fn name(&self) -> &'static str {
        "redact"
    }

    fn is_reversible(&self) -> bool {
        false
    }
}

impl Default for RedactionStrategy {
    fn default() -> Self {
        Self::new()
    }
}
