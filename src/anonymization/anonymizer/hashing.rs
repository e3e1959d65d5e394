//! Hash labels: `<ENTITY_TYPE_1a2b3c4d>`
//!
//! The label is derived from a salted SHA-256 of the value, so the same value
//! gets the same label in every engine that shares the salt. Labels are still
//! recorded in the mapping store, which is what makes them reversible.

use super::Anonymizer;
use crate::anonymization::mapping::{EntityMappingStore, RecordOutcome};
use crate::anonymization::models::EntityType;
use crate::anonymization::ordering::OrderingHint;
use crate::config::SecretString;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

const MIN_DIGEST_CHARS: usize = 8;

/// Salted-hash strategy
pub struct HashStrategy {
    salt: SecretString,
}

impl HashStrategy {
    /// Create a new hash strategy
    pub fn new(salt: SecretString) -> Self {
        Self { salt }
    }

    fn digest(&self, entity_type: &EntityType, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.expose_secret().as_bytes());
        hasher.update(entity_type.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(value.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl Anonymizer for HashStrategy {
    fn anonymize(
        &mut self,
        store: &mut EntityMappingStore,
        entity_type: &EntityType,
        value: &str,
        _hint: &OrderingHint,
    ) -> String {
        if let Some(label) = store.lookup(entity_type, value) {
            return label.to_string();
        }

        let digest = self.digest(entity_type, value);
        // Truncated digests can collide; lengthen until the label is free
        for width in (MIN_DIGEST_CHARS..=digest.len()).step_by(4) {
            let label = format!("<{entity_type}_{}>", &digest[..width]);
            match store.record(entity_type, value, &label) {
                RecordOutcome::Inserted | RecordOutcome::Existing => return label,
                RecordOutcome::LabelTaken => {
                    tracing::debug!(entity_type = %entity_type, width = width, "Hash label collision");
                }
            }
        }

        // A full SHA-256 collision; keep the value unrecoverable rather than ambiguous
        tracing::warn!(entity_type = %entity_type, "Could not allocate a unique hash label");
        format!("<{entity_type}>")
    }

    fn name(&self) -> &'static str {
        "hash"
    }

    fn is_reversible(&self) -> bool {
        true
    }
}
