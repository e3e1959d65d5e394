//! Anonymization and detection configuration

use crate::anonymization::detector::{handle, secret};
use crate::anonymization::models::EntityType;
use crate::config::{secret_string, SecretString};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Label strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymizationStrategy {
    /// Replace with `<ENTITY_TYPE_index>` labels
    Counter,
    /// Replace with salted-hash labels (`<ENTITY_TYPE_1a2b3c4d>`)
    Hash,
    /// Replace with `<ENTITY_TYPE>`, not reversible
    Redact,
}

impl Default for AnonymizationStrategy {
    fn default() -> Self {
        Self::Counter
    }
}

impl AnonymizationStrategy {
    /// Parse a strategy name
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "counter" => Ok(Self::Counter),
            "hash" => Ok(Self::Hash),
            "redact" => Ok(Self::Redact),
            _ => anyhow::bail!("Unknown anonymization strategy: {value}"),
        }
    }

    /// Strategy name as used in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Hash => "hash",
            Self::Redact => "redact",
        }
    }
}

impl std::fmt::Display for AnonymizationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anonymization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Label strategy
    #[serde(default)]
    pub strategy: AnonymizationStrategy,

    /// Dry-run mode (detect but don't anonymize)
    #[serde(default)]
    pub dry_run: bool,

    /// Salt for the hash strategy
    #[serde(default)]
    pub hash_salt: Option<SecretString>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            strategy: AnonymizationStrategy::Counter,
            dry_run: false,
            hash_salt: None,
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.strategy == AnonymizationStrategy::Hash {
            match &self.hash_salt {
                Some(salt) if !salt.expose_secret().is_empty() => {}
                _ => anyhow::bail!("anonymization.hash_salt is required for the hash strategy"),
            }
        }

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_STRATEGY") {
            self.strategy = AnonymizationStrategy::parse(&val)
                .context("Invalid CLOAK_ANONYMIZATION_STRATEGY value")?;
        }

        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_DRY_RUN") {
            self.dry_run = val
                .parse()
                .context("Invalid CLOAK_ANONYMIZATION_DRY_RUN value")?;
        }

        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_HASH_SALT") {
            self.hash_salt = Some(secret_string(val));
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_true")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: true,
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("Audit log path cannot be empty when auditing is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid CLOAK_ANONYMIZATION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CLOAK_ANONYMIZATION_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid CLOAK_ANONYMIZATION_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}

/// Detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Language passed to recognizers
    #[serde(default = "default_language")]
    pub language: String,

    /// Spans scoring below this are ignored
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Entity types to keep; empty keeps everything
    #[serde(default)]
    pub entities: Vec<String>,

    /// Renames applied to detected entity types (`GPE = "LOCATION"`)
    #[serde(default = "default_entity_aliases")]
    pub entity_aliases: BTreeMap<String, String>,

    /// Path to pattern library TOML file; the embedded library when unset
    #[serde(default)]
    pub pattern_library: Option<PathBuf>,

    /// Random secret recognizer
    #[serde(default)]
    pub random_secret: RandomSecretConfig,

    /// Account handle recognizer
    #[serde(default)]
    pub account_handle: AccountHandleConfig,

    /// Fixed lists of values to detect
    #[serde(default)]
    pub deny_lists: Vec<DenyListConfig>,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_score_threshold() -> f32 {
    0.5
}

fn default_entity_aliases() -> BTreeMap<String, String> {
    [
        ("GPE", "LOCATION"),
        ("FAC", "LOCATION"),
        ("LOC", "LOCATION"),
        ("PER", "PERSON"),
        ("ORGANIZATION", "ORG"),
        ("NORP", "NRP"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            score_threshold: default_score_threshold(),
            entities: Vec::new(),
            entity_aliases: default_entity_aliases(),
            pattern_library: None,
            random_secret: RandomSecretConfig::default(),
            account_handle: AccountHandleConfig::default(),
            deny_lists: Vec::new(),
        }
    }
}

impl DetectionConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            anyhow::bail!("detection.language cannot be empty");
        }

        if !(0.0..=1.0).contains(&self.score_threshold) {
            anyhow::bail!(
                "detection.score_threshold must be between 0.0 and 1.0, got {}",
                self.score_threshold
            );
        }

        for entity in &self.entities {
            EntityType::new(entity)
                .with_context(|| format!("Invalid entity in detection.entities: {entity}"))?;
        }

        for (from, to) in &self.entity_aliases {
            EntityType::new(from)
                .and_then(|_| EntityType::new(to))
                .with_context(|| format!("Invalid entity alias: {from} -> {to}"))?;
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        if self.random_secret.min_length == 0 {
            anyhow::bail!("detection.random_secret.min_length must be at least 1");
        }

        if self.account_handle.min_length == 0 {
            anyhow::bail!("detection.account_handle.min_length must be at least 1");
        }

        for list in &self.deny_lists {
            list.validate()?;
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("CLOAK_DETECTION_LANGUAGE") {
            self.language = val;
        }

        if let Ok(val) = std::env::var("CLOAK_DETECTION_SCORE_THRESHOLD") {
            self.score_threshold = val
                .parse()
                .context("Invalid CLOAK_DETECTION_SCORE_THRESHOLD value")?;
        }

        if let Ok(val) = std::env::var("CLOAK_DETECTION_ENTITIES") {
            self.entities = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(val) = std::env::var("CLOAK_DETECTION_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

/// Random secret recognizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomSecretConfig {
    /// Enable the recognizer
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum candidate length
    #[serde(default = "default_secret_min_length")]
    pub min_length: usize,
}

fn default_secret_min_length() -> usize {
    secret::DEFAULT_MIN_LENGTH
}

impl Default for RandomSecretConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_length: default_secret_min_length(),
        }
    }
}

/// Account handle recognizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountHandleConfig {
    /// Enable the recognizer
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Minimum token length
    #[serde(default = "default_handle_min_length")]
    pub min_length: usize,

    /// Words that raise the score when they precede a token
    #[serde(default = "handle::default_keywords")]
    pub keywords: Vec<String>,
}

fn default_handle_min_length() -> usize {
    handle::DEFAULT_MIN_LENGTH
}

impl Default for AccountHandleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_length: default_handle_min_length(),
            keywords: handle::default_keywords(),
        }
    }
}

/// One deny list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenyListConfig {
    /// Entity type reported for matches
    pub entity_type: String,

    /// Values to detect
    pub values: Vec<String>,

    /// Match case exactly
    #[serde(default = "default_true")]
    pub case_sensitive: bool,

    /// Score given to matches
    #[serde(default = "default_deny_list_score")]
    pub score: f32,
}

fn default_deny_list_score() -> f32 {
    1.0
}

impl DenyListConfig {
    /// Validate a deny list
    pub fn validate(&self) -> Result<()> {
        EntityType::new(&self.entity_type)
            .with_context(|| format!("Invalid deny list entity type: {}", self.entity_type))?;
        if !(0.0..=1.0).contains(&self.score) {
            anyhow::bail!(
                "Deny list score for {} must be between 0.0 and 1.0, got {}",
                self.entity_type,
                self.score
            );
        }
        Ok(())
    }
}
