//! Data models shared by detection, labeling and restoration

pub mod entity;
pub mod record;
pub mod span;

pub use entity::{kinds, EntityType};
pub use record::{AnonymizationStats, AnonymizedText, SubstitutionItem};
pub use span::Span;
