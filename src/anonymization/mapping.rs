//! Entity mapping store
//!
//! Per-engine table of `(entity_type, real_value) -> label` together with its
//! exact inverse `label -> real_value`. The inverse is maintained on every
//! insert, so a reverse lookup always sees everything recorded so far.
//!
//! The store lives exactly as long as the engine that owns it; nothing is
//! persisted.

use crate::anonymization::models::EntityType;
use std::collections::{BTreeMap, HashMap};

/// Real value behind a label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Entity type the value was detected as
    pub entity_type: EntityType,
    /// Original text
    pub value: String,
}

/// Outcome of [`EntityMappingStore::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new pair was stored
    Inserted,
    /// The pair was already known; nothing changed
    Existing,
    /// The label already belongs to another value; nothing changed
    LabelTaken,
}

/// Bidirectional mapping between real values and labels
#[derive(Debug, Default)]
pub struct EntityMappingStore {
    forward: BTreeMap<EntityType, BTreeMap<String, String>>,
    inverse: HashMap<String, MappingEntry>,
}

impl EntityMappingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value/label pair
    ///
    /// Idempotent: recording a value that already has a label keeps the
    /// existing label. A label that is already owned by a different value is
    /// refused so that the inverse map stays exact.
    pub fn record(&mut self, entity_type: &EntityType, value: &str, label: &str) -> RecordOutcome {
        if self.lookup(entity_type, value).is_some() {
            return RecordOutcome::Existing;
        }
        if self.inverse.contains_key(label) {
            return RecordOutcome::LabelTaken;
        }

        self.forward
            .entry(entity_type.clone())
            .or_default()
            .insert(value.to_string(), label.to_string());
        self.inverse.insert(
            label.to_string(),
            MappingEntry {
                entity_type: entity_type.clone(),
                value: value.to_string(),
            },
        );
        RecordOutcome::Inserted
    }

    /// Label previously assigned to a value
    pub fn lookup(&self, entity_type: &EntityType, value: &str) -> Option<&str> {
        self.forward
            .get(entity_type)
            .and_then(|values| values.get(value))
            .map(String::as_str)
    }

    /// Real value behind a label, `None` for labels this store never issued
    pub fn reverse_lookup(&self, label: &str) -> Option<&str> {
        self.inverse.get(label).map(|entry| entry.value.as_str())
    }

    /// Full entry behind a label
    pub fn entry(&self, label: &str) -> Option<&MappingEntry> {
        self.inverse.get(label)
    }

    /// Whether a label has been issued
    pub fn contains_label(&self, label: &str) -> bool {
        self.inverse.contains_key(label)
    }

    /// Number of distinct values recorded
    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }

    /// Number of distinct values recorded for one entity type
    pub fn count_for(&self, entity_type: &EntityType) -> usize {
        self.forward.get(entity_type).map_or(0, BTreeMap::len)
    }

    /// Iterate over `(entity_type, value, label)` triples, ordered by type then value
    pub fn entries(&self) -> impl Iterator<Item = (&EntityType, &str, &str)> {
        self.forward.iter().flat_map(|(entity_type, values)| {
            values
                .iter()
                .map(move |(value, label)| (entity_type, value.as_str(), label.as_str()))
        })
    }
}
