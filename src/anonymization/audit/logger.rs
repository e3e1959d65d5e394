//! Audit logger for anonymization operations

use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry for one anonymize call
#[derive(Debug, Serialize)]
pub struct AuditEvent {
    /// When the call finished
    pub timestamp: DateTime<Utc>,
    /// Identifier correlating this entry with application logs
    pub request_id: Uuid,
    /// Label strategy in effect
    pub strategy: String,
    /// Whether the call only detected
    pub dry_run: bool,
    /// Wall-clock time spent in the call
    pub processing_time_ms: u64,
    /// Number of substitutions (or detections in dry-run mode)
    pub substitutions_count: usize,
    /// What was replaced
    pub substitutions: Vec<AuditSubstitution>,
}

/// Audit substitution entry (with hashed PII)
#[derive(Debug, Clone, Serialize)]
pub struct AuditSubstitution {
    /// Entity type of the replaced value
    pub entity_type: String,
    /// Label written in place of the value, absent in dry-run mode
    pub label: Option<String>,
    /// Detector confidence
    pub score: f32,
    /// SHA-256 hash of original value (never log plaintext PII)
    pub value_hash: String,
}

impl AuditSubstitution {
    /// Build an entry, hashing `original_value`
    pub fn new(
        entity_type: &EntityType,
        label: Option<String>,
        score: f32,
        original_value: &str,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            label,
            score,
            value_hash: hash_pii_value(original_value),
        }
    }
}

/// Hash a PII value using SHA-256
pub fn hash_pii_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Audit logger for anonymization operations
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            // Ensure parent directory exists
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Log one anonymize call
    pub fn log_event(&self, event: &AuditEvent) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(event).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            // Plain text format
            writeln!(
                file,
                "[{}] Request: {} | Substitutions: {} | Strategy: {}{} | Time: {}ms",
                event.timestamp.to_rfc3339(),
                event.request_id,
                event.substitutions_count,
                event.strategy,
                if event.dry_run { " (dry run)" } else { "" },
                event.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}
