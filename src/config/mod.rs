//! Configuration management for Cloak.
//!
//! Cloak reads a TOML file (`cloak.toml` by default) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CLOAK_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cloak::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cloak.toml")?;
//! println!("Strategy: {}", config.anonymization.strategy);
//! if let Some(upstream) = &config.upstream {
//!     println!("Upstream: {}", upstream.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DetectionConfig`] - Recognizers, thresholds, aliases, deny lists
//! - [`AnonymizationConfig`] - Label strategy, dry run, hash salt, audit log
//! - [`UpstreamConfig`] - Chat-completion endpoint and credentials
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [detection]
//! score_threshold = 0.5
//!
//! [[detection.deny_lists]]
//! entity_type = "PERSON"
//! values = ["Alice", "Bob"]
//!
//! [anonymization]
//! strategy = "counter"
//!
//! [upstream]
//! url = "https://api.openai.com/v1/chat/completions"
//! api_key = "${OPENAI_API_KEY}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use crate::anonymization::config::{AnonymizationConfig, AuditConfig, DetectionConfig};
pub use loader::{load_config, load_config_from_str};
pub use schema::{ApplicationConfig, CloakConfig, Environment, LoggingConfig, UpstreamConfig};
pub use secret::{secret_string, SecretString, SecretValue};
