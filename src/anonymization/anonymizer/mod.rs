//! Label strategies
//!
//! The closed set of ways a detected value can be replaced. The engine picks
//! one at construction time from [`AnonymizationStrategy`](crate::anonymization::config::AnonymizationStrategy).

pub mod counter;
pub mod hashing;
pub mod redaction;

use crate::anonymization::mapping::EntityMappingStore;
use crate::anonymization::models::EntityType;
use crate::anonymization::ordering::OrderingHint;

/// Trait for label strategy implementations
pub trait Anonymizer: Send + Sync {
    /// Produce the replacement text for one real value
    ///
    /// Reversible strategies record the pair in `store`; a value the store
    /// already knows must come back with its existing label.
    fn anonymize(
        &mut self,
        store: &mut EntityMappingStore,
        entity_type: &EntityType,
        value: &str,
        hint: &OrderingHint,
    ) -> String;

    /// Called once per substitution pass, before any value is labeled
    fn prepare(&self, _hint: &mut OrderingHint) {}

    /// Strategy name recorded in substitution items
    fn name(&self) -> &'static str;

    /// Whether labels from this strategy can be restored
    fn is_reversible(&self) -> bool;
}
