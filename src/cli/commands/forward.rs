//! Forward command implementation
//!
//! Reads a chat-completion request from a file, sends it through the
//! [`ForwardingProxy`] and prints the restored response.

use super::{exit_code_for, load_or_default};
use crate::core::ForwardingProxy;
use crate::domain::{CloakError, Result};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the forward command
#[derive(Args, Debug)]
pub struct ForwardArgs {
    /// Chat-completion request JSON file (`-` reads stdin)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Override the upstream URL from the configuration
    #[arg(long)]
    pub url: Option<String>,

    /// Print the response on a single line
    #[arg(long)]
    pub compact: bool,
}

impl ForwardArgs {
    /// Execute the forward command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match self.run(config_path).await {
            Ok(()) => Ok(0),
            Err(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "Forward failed");
                eprintln!("❌ {e}");
                if e.is_retryable() {
                    eprintln!("   The upstream error is transient, the request can be retried");
                }
                Ok(exit_code_for(&e))
            }
        }
    }

    async fn run(&self, config_path: &str) -> Result<()> {
        let mut config = load_or_default(config_path)?;

        if let Some(ref url) = self.url {
            tracing::info!(url = %url, "Overriding upstream URL from CLI");
            config.upstream.get_or_insert_with(Default::default).url = url.clone();
            config
                .validate()
                .map_err(|e| CloakError::Configuration(format!("Configuration validation failed: {e}")))?;
        }

        let request = self.read_request()?;
        let proxy = ForwardingProxy::from_config(&config)?;
        let report = proxy.forward_with_report(request).await?;

        let rendered = if self.compact {
            serde_json::to_string(&report.response)?
        } else {
            serde_json::to_string_pretty(&report.response)?
        };
        println!("{rendered}");

        eprintln!();
        eprintln!(
            "✅ Request {} completed in {:.2}s: {} replacement(s), {} label(s) restored",
            report.request_id,
            report.duration.as_secs_f64(),
            report.stats.substitutions,
            report.stats.tokens_restored
        );
        if report.stats.unknown_tokens > 0 {
            eprintln!(
                "   {} label-like token(s) in the response had no mapping and were left as is",
                report.stats.unknown_tokens
            );
        }

        Ok(())
    }

    fn read_request(&self) -> Result<Value> {
        let contents = if self.input.as_os_str() == "-" {
            std::io::read_to_string(std::io::stdin())?
        } else {
            std::fs::read_to_string(&self.input).map_err(|e| {
                CloakError::Io(format!("Failed to read {}: {e}", self.input.display()))
            })?
        };
        serde_json::from_str(&contents)
            .map_err(|e| CloakError::InvalidInput(format!("Request is not valid JSON: {e}")))
    }
}
