//! Configuration schema types
//!
//! This module defines the structure of `cloak.toml`.

use crate::anonymization::config::{AnonymizationConfig, DetectionConfig};
use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Cloak configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CloakConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// PII detection settings
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Labeling and audit settings
    #[serde(default)]
    pub anonymization: AnonymizationConfig,

    /// Downstream chat-completion API (required for `forward`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CloakConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.detection.validate().map_err(|e| format!("{e:#}"))?;
        self.anonymization.validate().map_err(|e| format!("{e:#}"))?;
        if let Some(ref upstream) = self.upstream {
            upstream.validate(&self.environment)?;
        }
        self.logging.validate()?;
        Ok(())
    }

    /// The upstream section, or an error naming what is missing
    pub fn require_upstream(&self) -> Result<&UpstreamConfig, String> {
        self.upstream
            .as_ref()
            .ok_or_else(|| "[upstream] configuration is required to forward requests".to_string())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Downstream chat-completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Chat-completion endpoint URL
    pub url: String,

    /// Bearer token sent with every request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification exposes the labeled
    /// traffic and the API key to man-in-the-middle attacks. It is rejected in
    /// production environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl UpstreamConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.url.is_empty() {
            return Err("upstream.url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| format!("upstream.url '{}' is not a valid URL: {e}", self.url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("upstream.url must start with http:// or https://".to_string());
        }

        if let Some(ref key) = self.api_key {
            if key.expose_secret().is_empty() {
                return Err("upstream.api_key cannot be empty when set".to_string());
            }
        }

        if self.timeout_seconds == 0 {
            return Err("upstream.timeout_seconds must be > 0".to_string());
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true' or use environment = \"development\" for local testing."
                    .to_string(),
            );
        }

        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn upstream(url: &str) -> UpstreamConfig {
        UpstreamConfig {
            url: url.to_string(),
            api_key: Some(secret_string("sk-test".to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upstream_config_validation() {
        assert!(upstream("https://router.example.com/v1/chat/completions")
            .validate(&Environment::Development)
            .is_ok());
        assert!(upstream("").validate(&Environment::Development).is_err());
        assert!(upstream("ftp://example.com")
            .validate(&Environment::Development)
            .is_err());
        assert!(upstream("not a url")
            .validate(&Environment::Development)
            .is_err());

        let mut config = upstream("https://example.com");
        config.timeout_seconds = 0;
        assert!(config.validate(&Environment::Development).is_err());

        config.timeout_seconds = 30;
        config.api_key = Some(secret_string(String::new()));
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_upstream_tls_verification_in_production() {
        let mut config = upstream("https://example.com");
        config.tls_verify = false;

        let result = config.validate(&Environment::Production);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains("TLS certificate verification cannot be disabled in production"));

        assert!(config.validate(&Environment::Development).is_ok());
        assert!(config.validate(&Environment::Staging).is_ok());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());

        let bad = LoggingConfig {
            local_rotation: "weekly".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = CloakConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.require_upstream().is_err());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_timeout_seconds(), 60);
        assert_eq!(default_local_rotation(), "daily");
    }
}
