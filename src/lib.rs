// Cloak - Reversible PII labeling for chat-completion payloads
// Copyright (c) 2025 Cloak Contributors
// Licensed under the MIT License

//! # Cloak - reversible PII labeling
//!
//! Cloak removes personally identifiable information from chat-completion
//! requests before they leave a trust boundary and restores it in the response.
//!
//! ## Overview
//!
//! - **Detecting** PII with pattern, secret, handle and deny-list recognizers,
//!   or with spans supplied by an external NER service
//! - **Labeling** each distinct value with a stable token such as `<PERSON_0>`
//! - **Restoring** labels to real values anywhere in a JSON response
//! - **Forwarding** labeled requests to an OpenAI-compatible endpoint
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The forwarding proxy
//! - [`anonymization`] - Detection, labeling, mapping and restoration
//! - [`adapters`] - The upstream chat-completion client
//! - [`domain`] - Error types and the request model
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use cloak::anonymization::{AnonymizationConfig, AnonymizationEngine};
//! use serde_json::json;
//!
//! # fn main() -> cloak::domain::Result<()> {
//! let mut engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let payload = json!({"messages": [{"role": "user", "content": "Mail bo@example.com"}]});
//! let labeled = engine.anonymize(&payload)?;
//! assert_eq!(labeled["messages"][0]["content"], "Mail <EMAIL_ADDRESS_0>");
//!
//! assert_eq!(engine.deanonymize(&labeled), payload);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`]. A failure to anonymize
//! ([`domain::CloakError::Detection`], [`domain::CloakError::InvalidInput`]) is
//! never confused with a failure of the downstream API
//! ([`domain::CloakError::Transport`]); only the latter may be retried.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
