//! Appearance-order hints for label allocation
//!
//! A hint lists, per entity type, the distinct real values of one anonymization
//! call in the order they first appear in the text. Values the mapping store
//! already knows are left out: they keep the label they were given earlier.
//!
//! Each type also carries a `base` index, the allocator's counter at the start
//! of the call. A value at hint position `p` is labeled `base + p`, so indices
//! follow reading order within a call and never fall below anything handed out
//! by an earlier call.

use crate::anonymization::mapping::EntityMappingStore;
use crate::anonymization::models::{EntityType, Span};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct TypeOrder {
    base: usize,
    values: Vec<String>,
}

/// First-occurrence order of new values, per entity type
#[derive(Debug, Default, Clone)]
pub struct OrderingHint {
    per_type: HashMap<EntityType, TypeOrder>,
}

impl OrderingHint {
    /// A hint that knows nothing; allocation falls back to the counters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a hint from spans already sorted in reading order
    ///
    /// `spans` must have been validated against `text`.
    pub fn build<'a>(
        text: &str,
        spans: impl IntoIterator<Item = &'a Span>,
        store: &EntityMappingStore,
    ) -> Self {
        let mut per_type: HashMap<EntityType, TypeOrder> = HashMap::new();

        for span in spans {
            let value = span.value(text);
            if store.lookup(&span.entity_type, value).is_some() {
                continue;
            }
            let order = per_type.entry(span.entity_type.clone()).or_default();
            if !order.values.iter().any(|v| v == value) {
                order.values.push(value.to_string());
            }
        }

        Self { per_type }
    }

    /// Set the first index available to each entity type in this call
    pub fn set_bases(&mut self, mut base_for: impl FnMut(&EntityType) -> usize) {
        for (entity_type, order) in self.per_type.iter_mut() {
            order.base = base_for(entity_type);
        }
    }

    /// Index the hint suggests for a value, if the value is part of the hint
    pub fn suggested_index(&self, entity_type: &EntityType, value: &str) -> Option<usize> {
        let order = self.per_type.get(entity_type)?;
        order
            .values
            .iter()
            .position(|v| v == value)
            .map(|position| order.base + position)
    }

    /// Values of one type in first-occurrence order
    pub fn values(&self, entity_type: &EntityType) -> &[String] {
        self.per_type
            .get(entity_type)
            .map_or(&[], |order| order.values.as_slice())
    }

    /// Entity types the hint covers
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> {
        self.per_type.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, needle: &str, entity_type: &str) -> Span {
        let start = text.find(needle).unwrap();
        Span::new(
            start,
            start + needle.len(),
            EntityType::new(entity_type).unwrap(),
            0.85,
        )
    }

    #[test]
    fn test_first_occurrence_order() {
        let text = "Alice met Bob, then Alice met Carol at Acme";
        let alice_again = Span::new(20, 25, EntityType::new("PERSON").unwrap(), 0.85);
        let spans = vec![
            span(text, "Alice", "PERSON"),
            span(text, "Bob", "PERSON"),
            alice_again,
            span(text, "Carol", "PERSON"),
            span(text, "Acme", "ORG"),
        ];

        let hint = OrderingHint::build(text, &spans, &EntityMappingStore::new());
        let person = EntityType::new("PERSON").unwrap();
        assert_eq!(hint.values(&person), &["Alice", "Bob", "Carol"]);
        assert_eq!(hint.suggested_index(&person, "Carol"), Some(2));
        assert_eq!(hint.values(&EntityType::new("ORG").unwrap()), &["Acme"]);
    }

    #[test]
    fn test_known_values_are_skipped_and_bases_applied() {
        let text = "John and Bob";
        let person = EntityType::new("PERSON").unwrap();
        let mut store = EntityMappingStore::new();
        store.record(&person, "John", "<PERSON_0>");

        let spans = vec![span(text, "John", "PERSON"), span(text, "Bob", "PERSON")];
        let mut hint = OrderingHint::build(text, &spans, &store);
        hint.set_bases(|_| 1);

        assert_eq!(hint.values(&person), &["Bob"]);
        assert_eq!(hint.suggested_index(&person, "John"), None);
        assert_eq!(hint.suggested_index(&person, "Bob"), Some(1));
    }

    #[test]
    fn test_empty_hint() {
        let hint = OrderingHint::empty();
        let person = EntityType::new("PERSON").unwrap();
        assert!(hint.values(&person).is_empty());
        assert_eq!(hint.suggested_index(&person, "Anyone"), None);
        assert_eq!(hint.entity_types().count(), 0);
    }
}
