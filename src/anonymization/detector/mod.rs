//! PII detection module
//!
//! Provides the detection seams and the built-in pattern-based recognizers.
//!
//! A [`Recognizer`] finds one family of PII in plain text. A [`SpanDetector`]
//! is what the engine talks to: it returns every span above a score
//! threshold, in any order, possibly overlapping. [`CompositeDetector`] is the
//! built-in detector that fans out to a list of recognizers. An external NER
//! service plugs in by implementing either trait.

pub mod composite;
pub mod deny_list;
pub mod handle;
pub mod patterns;
pub mod regex;
pub mod secret;

use crate::anonymization::models::{EntityType, Span};
use crate::domain::Result;

pub use composite::CompositeDetector;
pub use deny_list::DenyListRecognizer;
pub use handle::AccountHandleRecognizer;
pub use regex::RegexDetector;
pub use secret::RandomSecretRecognizer;

/// Trait for span detection implementations
pub trait SpanDetector: Send + Sync {
    /// Detect PII spans in `text`
    ///
    /// Spans scoring below `score_threshold` are not returned. Offsets are
    /// byte offsets into `text`.
    fn detect(&self, text: &str, language: &str, score_threshold: f32) -> Result<Vec<Span>>;
}

/// A single family of PII detection
pub trait Recognizer: Send + Sync {
    /// Recognizer name, used in logs
    fn name(&self) -> &str;

    /// Entity types this recognizer can report
    fn supported_entities(&self) -> Vec<EntityType>;

    /// Find candidate spans in `text`
    fn analyze(&self, text: &str, language: &str) -> Result<Vec<Span>>;
}
