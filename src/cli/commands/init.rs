//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cloak.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Cloak configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put your upstream key in a .env file:");
                println!("     CLOAK_UPSTREAM_API_KEY=sk-...");
                println!("  3. Validate configuration: cloak validate-config");
                println!("  4. Try it: cloak anonymize --text \"Mail jane@example.com\"");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Cloak Configuration File
# Reversible PII labeling for chat-completion payloads

environment = "development"

[application]
log_level = "info"

[detection]
score_threshold = 0.5

[anonymization]
strategy = "counter"
dry_run = false

[upstream]
url = "https://api.openai.com/v1/chat/completions"
api_key = "${CLOAK_UPSTREAM_API_KEY}"
timeout_seconds = 60

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Cloak Configuration File
#
# Cloak replaces PII in chat-completion requests with labels such as
# <PERSON_0> or <EMAIL_ADDRESS_1>, forwards the labeled request and puts the
# real values back into the response.
#
# Every key can be overridden with CLOAK_<SECTION>_<KEY>, for example
# CLOAK_ANONYMIZATION_STRATEGY=redact. Values may reference environment
# variables with ${VAR_NAME}.

# Runtime environment: development | staging | production
# TLS verification cannot be disabled in production.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Detection
# ============================================================================
[detection]
# Language passed to recognizers
language = "en"

# Spans scoring below this are ignored (0.0 - 1.0)
score_threshold = 0.5

# Entity types to keep; empty keeps everything
entities = []

# Custom pattern library; the built-in library is used when unset
# pattern_library = "./patterns/pii_patterns.toml"

# Renames applied to detected entity types
[detection.entity_aliases]
GPE = "LOCATION"
FAC = "LOCATION"
LOC = "LOCATION"
PER = "PERSON"
ORGANIZATION = "ORG"
NORP = "NRP"

# Passwords, API keys and similar high-entropy tokens
[detection.random_secret]
enabled = true
min_length = 8

# Usernames such as jdoe42, scored higher after words like "user" or "login"
[detection.account_handle]
enabled = true
min_length = 5
keywords = ["user", "username", "login", "handle", "account", "id"]

# Known values to detect as whole words
[[detection.deny_lists]]
entity_type = "PERSON"
values = ["Alice", "Bob"]
case_sensitive = true
score = 1.0

# ============================================================================
# Anonymization
# ============================================================================
[anonymization]
# Label strategy:
# - counter: <PERSON_0>, <PERSON_1>, ...
# - hash:    <PERSON_1a2b3c4d>, salted SHA-256, needs hash_salt
# - redact:  <PERSON>, not reversible
strategy = "counter"

# Detect only, send the request unchanged
dry_run = false

# hash_salt = "${CLOAK_ANONYMIZATION_HASH_SALT}"

[anonymization.audit]
# One line per anonymized request; values are stored as SHA-256 hashes only
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

# ============================================================================
# Upstream chat-completion API
# ============================================================================
[upstream]
url = "https://api.openai.com/v1/chat/completions"

# Bearer token (use environment variable)
api_key = "${CLOAK_UPSTREAM_API_KEY}"

# Request timeout in seconds
timeout_seconds = 60

# TLS certificate verification
tls_verify = true

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# Rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CloakConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "cloak.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "cloak.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config() {
        let content = InitArgs::generate_minimal_config();
        let config: CloakConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.upstream.is_some());
    }

    #[test]
    fn test_generate_config_with_examples() {
        let content = InitArgs::generate_config_with_examples();
        let config: CloakConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.detection.deny_lists.len(), 1);
        assert_eq!(config.detection.entity_aliases["GPE"], "LOCATION");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cloak.toml");
        std::fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "# existing");
    }
}
