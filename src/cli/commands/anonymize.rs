//! Anonymize command implementation
//!
//! Labels PII in a single text or in a JSON payload and prints the result.
//! A summary of what was replaced goes to stderr so stdout can be piped.

use super::{exit_code_for, load_or_default};
use crate::anonymization::{AnonymizationEngine, AnonymizationStats, AnonymizationStrategy, Span};
use crate::domain::{CloakError, Result};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// Text to anonymize
    #[arg(long, conflicts_with = "input", required_unless_present = "input")]
    pub text: Option<String>,

    /// JSON payload file to anonymize (`-` reads stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// JSON file of spans from an external detector, used instead of detection
    #[arg(long, requires = "text", conflicts_with = "input")]
    pub spans: Option<PathBuf>,

    /// Override the label strategy (counter, hash, redact)
    #[arg(long)]
    pub strategy: Option<String>,

    /// Detect only, leave the input unchanged
    #[arg(long)]
    pub dry_run: bool,

    /// Restore the output again and check it matches the input
    #[arg(long)]
    pub verify: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match self.run(config_path) {
            Ok(code) => Ok(code),
            Err(e) => {
                tracing::error!(error = %e, "Anonymization failed");
                eprintln!("❌ {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn run(&self, config_path: &str) -> Result<i32> {
        if self.spans.is_some() && self.text.is_none() {
            return Err(CloakError::InvalidInput(
                "--spans applies to --text only; payload files are always detected".to_string(),
            ));
        }

        let mut config = load_or_default(config_path)?;

        if let Some(ref strategy) = self.strategy {
            config.anonymization.strategy = AnonymizationStrategy::parse(strategy)
                .map_err(|e| CloakError::Configuration(e.to_string()))?;
        }
        if self.dry_run {
            tracing::info!("Enabling anonymization dry-run mode from CLI");
            config.anonymization.dry_run = true;
        }

        let mut engine = AnonymizationEngine::from_config(config.anonymization, &config.detection)?;

        let round_trip_ok = match (&self.text, &self.input) {
            (Some(text), _) => {
                let labeled = match self.spans {
                    Some(ref path) => engine.substitute(text, &read_spans(path)?)?,
                    None => engine.anonymize_text(text)?,
                };
                println!("{}", labeled.text);
                engine.deanonymize_text(&labeled.text, &labeled.items) == *text
            }
            (None, Some(path)) => {
                let payload = read_payload(path)?;
                let labeled = engine.anonymize(&payload)?;
                println!("{}", serde_json::to_string_pretty(&labeled)?);
                engine.deanonymize(&labeled) == payload
            }
            (None, None) => {
                return Err(CloakError::InvalidInput(
                    "either --text or --input is required".to_string(),
                ))
            }
        };

        print_summary(&engine.stats(), engine.strategy(), engine.is_dry_run());

        if self.verify {
            if round_trip_ok {
                eprintln!("✅ Round trip restores the input exactly");
            } else {
                eprintln!("❌ Round trip does not restore the input");
                return Ok(5);
            }
        }

        Ok(0)
    }
}

fn read_payload(path: &Path) -> Result<Value> {
    let contents = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CloakError::Io(format!("Failed to read {}: {e}", path.display())))?
    };
    serde_json::from_str(&contents)
        .map_err(|e| CloakError::InvalidInput(format!("{} is not valid JSON: {e}", path.display())))
}

fn read_spans(path: &Path) -> Result<Vec<Span>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CloakError::Io(format!("Failed to read {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| CloakError::InvalidInput(format!("Malformed spans file: {e}")))?;
    Span::parse_many(&value)
}

fn print_summary(stats: &AnonymizationStats, strategy: AnonymizationStrategy, dry_run: bool) {
    eprintln!();
    if dry_run {
        eprintln!("🔍 Dry run: {} span(s) detected, nothing replaced", stats.spans_detected);
    } else {
        eprintln!(
            "✅ {} replacement(s) with the {} strategy",
            stats.substitutions, strategy
        );
    }
    for (entity_type, count) in &stats.by_entity_type {
        eprintln!("   {entity_type}: {count}");
    }
    if stats.overlaps_discarded > 0 {
        eprintln!("   {} overlapping span(s) discarded", stats.overlaps_discarded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args() -> AnonymizeArgs {
        AnonymizeArgs {
            text: None,
            input: None,
            spans: None,
            strategy: None,
            dry_run: false,
            verify: true,
        }
    }

    #[test]
    fn test_text_round_trip() {
        let args = AnonymizeArgs {
            text: Some("Write to ana@example.com".to_string()),
            ..args()
        };
        assert_eq!(args.run("missing-cloak.toml").unwrap(), 0);
    }

    #[test]
    fn test_external_spans() {
        let mut spans = NamedTempFile::new().unwrap();
        spans
            .write_all(br#"[{"start": 0, "end": 5, "entity_type": "PERSON", "score": 0.9}]"#)
            .unwrap();

        let args = AnonymizeArgs {
            text: Some("Alice says hi".to_string()),
            spans: Some(spans.path().to_path_buf()),
            ..args()
        };
        assert_eq!(args.run("missing-cloak.toml").unwrap(), 0);
    }

    #[test]
    fn test_out_of_bounds_spans_are_invalid_input() {
        let mut spans = NamedTempFile::new().unwrap();
        spans
            .write_all(br#"[{"start": 0, "end": 50, "entity_type": "PERSON", "score": 0.9}]"#)
            .unwrap();

        let args = AnonymizeArgs {
            text: Some("short".to_string()),
            spans: Some(spans.path().to_path_buf()),
            ..args()
        };
        let err = args.run("missing-cloak.toml").unwrap_err();
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_spans_with_payload_file_is_rejected() {
        let mut payload = NamedTempFile::new().unwrap();
        payload
            .write_all(br#"{"messages": [{"role": "user", "content": "Ada"}]}"#)
            .unwrap();
        let mut spans = NamedTempFile::new().unwrap();
        spans
            .write_all(br#"[{"start": 0, "end": 3, "entity_type": "PERSON", "score": 0.9}]"#)
            .unwrap();

        let args = AnonymizeArgs {
            input: Some(payload.path().to_path_buf()),
            spans: Some(spans.path().to_path_buf()),
            ..args()
        };
        let err = args.run("missing-cloak.toml").unwrap_err();
        assert!(matches!(err, CloakError::InvalidInput(_)));
        assert_eq!(exit_code_for(&err), 3);
    }

    #[test]
    fn test_payload_file() {
        let mut payload = NamedTempFile::new().unwrap();
        payload
            .write_all(br#"{"messages": [{"role": "user", "content": "call 555-123-4567"}], "n": 1}"#)
            .unwrap();

        let args = AnonymizeArgs {
            input: Some(payload.path().to_path_buf()),
            ..args()
        };
        assert_eq!(args.run("missing-cloak.toml").unwrap(), 0);
    }

    #[test]
    fn test_unknown_strategy_is_configuration_error() {
        let args = AnonymizeArgs {
            text: Some("hi".to_string()),
            strategy: Some("shuffle".to_string()),
            ..args()
        };
        let err = args.run("missing-cloak.toml").unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }
}
