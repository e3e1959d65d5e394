//! Counter labels: `<ENTITY_TYPE_index>`

use super::Anonymizer;
use crate::anonymization::mapping::{EntityMappingStore, RecordOutcome};
use crate::anonymization::models::EntityType;
use crate::anonymization::ordering::OrderingHint;
use std::collections::HashMap;

/// Format a counter label
pub fn format_label(entity_type: &EntityType, index: usize) -> String {
    format!("<{entity_type}_{index}>")
}

/// Label allocator handing out per-type indices
///
/// Indices are assigned in order of first appearance within a call (through
/// the ordering hint) and keep increasing across calls. An index is never
/// reused, even when the hint skipped past it.
#[derive(Debug, Default)]
pub struct CounterStrategy {
    /// Next free index for each entity type
    counters: HashMap<EntityType, usize>,
}

impl CounterStrategy {
    /// Create a new counter strategy
    pub fn new() -> Self {
        Self::default()
    }

    /// Next index the counter would hand out for a type
    pub fn next_index(&self, entity_type: &EntityType) -> usize {
        self.counters.get(entity_type).copied().unwrap_or(0)
    }

    /// Assign a label, reusing the stored one when the value is known
    pub fn allocate(
        &mut self,
        store: &mut EntityMappingStore,
        entity_type: &EntityType,
        value: &str,
        hint: &OrderingHint,
    ) -> String {
        if let Some(label) = store.lookup(entity_type, value) {
            return label.to_string();
        }

        let mut index = hint
            .suggested_index(entity_type, value)
            .unwrap_or_else(|| self.next_index(entity_type));

        loop {
            let label = format_label(entity_type, index);
            match store.record(entity_type, value, &label) {
                RecordOutcome::Inserted => {
                    let counter = self.counters.entry(entity_type.clone()).or_insert(0);
                    *counter = (*counter).max(index + 1);
                    tracing::trace!(entity_type = %entity_type, label = %label, "Allocated label");
                    return label;
                }
                RecordOutcome::Existing => {
                    return store
                        .lookup(entity_type, value)
                        .map(str::to_string)
                        .unwrap_or(label);
                }
                RecordOutcome::LabelTaken => {
                    tracing::debug!(
                        entity_type = %entity_type,
                        index = index,
                        "Suggested index already taken, moving past it"
                    );
                    index = self.next_index(entity_type).max(index + 1);
                }
            }
        }
    }
}

impl Anonymizer for CounterStrategy {
    fn anonymize(
        &mut self,
        store: &mut EntityMappingStore,
        entity_type: &EntityType,
        value: &str,
        hint: &OrderingHint,
    ) -> String {
        self.allocate(store, entity_type, value, hint)
    }

    fn prepare(&self, hint: &mut OrderingHint) {
        hint.set_bases(|entity_type| self.next_index(entity_type));
    }

    fn name(&self) -> &'static str {
        "counter"
    }

    fn is_reversible(&self) -> bool {
        true
    }
}
