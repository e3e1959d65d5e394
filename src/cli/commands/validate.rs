//! Validate config command implementation
//!
//! Loads the configuration file, builds every configured recognizer and
//! prints a summary. Secrets are never printed.

use crate::anonymization::detector::CompositeDetector;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        // Pattern library and deny lists only fail once compiled
        let detector = match CompositeDetector::from_config(&config.detection) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Detection configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Language: {}", config.detection.language);
        println!("  Score Threshold: {}", config.detection.score_threshold);
        let entities: Vec<String> = detector
            .supported_entities()
            .iter()
            .map(|e| e.to_string())
            .collect();
        println!("  Detected Entities: {}", entities.join(", "));
        println!("  Deny Lists: {}", config.detection.deny_lists.len());
        println!("  Strategy: {}", config.anonymization.strategy);
        println!("  Dry Run: {}", config.anonymization.dry_run);
        println!(
            "  Audit Log: {}",
            if config.anonymization.audit.enabled {
                config.anonymization.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        match config.upstream {
            Some(ref upstream) => {
                println!("  Upstream: {}", upstream.url);
                println!(
                    "  Upstream API Key: {}",
                    if upstream.api_key.is_some() { "set" } else { "not set" }
                );
                println!("  Upstream Timeout: {}s", upstream.timeout_seconds);
            }
            None => println!("  Upstream: not configured (forward is unavailable)"),
        }
        println!();
        Ok(0)
    }
}
