//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Cloak using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Cloak - reversible PII labeling for chat-completion payloads
#[derive(Parser, Debug)]
#[command(name = "cloak")]
#[command(version, about, long_about = None)]
#[command(author = "Cloak Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cloak.toml", env = "CLOAK_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLOAK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Label PII in a text or JSON payload and print the result
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Anonymize a request, send it upstream and print the restored response
    Forward(commands::forward::ForwardArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_anonymize_text() {
        let cli = Cli::parse_from(["cloak", "anonymize", "--text", "Hi Bob"]);
        assert_eq!(cli.config, "cloak.toml");
        match cli.command {
            Commands::Anonymize(args) => assert_eq!(args.text.as_deref(), Some("Hi Bob")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cloak", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cloak", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_forward() {
        let cli = Cli::parse_from(["cloak", "forward", "--input", "request.json"]);
        assert!(matches!(cli.command, Commands::Forward(_)));
    }

    #[test]
    fn test_cli_anonymize_requires_one_source() {
        assert!(Cli::try_parse_from(["cloak", "anonymize"]).is_err());
        assert!(Cli::try_parse_from([
            "cloak", "anonymize", "--text", "a", "--input", "b.json"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_spans_only_with_text() {
        assert!(Cli::try_parse_from([
            "cloak", "anonymize", "--input", "b.json", "--spans", "s.json"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "cloak", "anonymize", "--text", "a", "--spans", "s.json"
        ])
        .is_ok());
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cloak", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
