//! Anonymization module for Cloak
//!
//! This module turns PII in chat-completion payloads into reversible labels
//! and turns the labels back into real values in the response.
//!
//! # Architecture
//!
//! The anonymization pipeline consists of:
//! - **Detection**: pattern recognizers behind the [`detector::SpanDetector`] seam
//! - **Substitution**: overlap resolution and offset-corrected replacement
//! - **Labeling**: counter, salted-hash or redaction strategies
//! - **Mapping**: per-engine table of real values and their labels
//! - **Restoration**: label scanning and reverse lookup, recursively over JSON
//! - **Audit**: Structured logging with hashed PII values
//!
//! # Usage
//!
//! ```rust,ignore
//! use cloak::anonymization::{AnonymizationEngine, config::AnonymizationConfig};
//!
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let labeled = engine.anonymize_text("Alice wrote to bob@example.com")?;
//! let restored = engine.deanonymize_text(&labeled.text, &labeled.items);
//! ```

pub mod anonymizer;
pub mod audit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod mapping;
pub mod models;
pub mod ordering;
pub mod restore;
pub mod substitution;
pub mod walker;

// Re-export main types
pub use config::{AnonymizationConfig, AnonymizationStrategy, DetectionConfig};
pub use engine::AnonymizationEngine;
pub use mapping::EntityMappingStore;
pub use models::{AnonymizationStats, AnonymizedText, EntityType, Span, SubstitutionItem};
