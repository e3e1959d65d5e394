//! Structured logging setup using tracing
//!
//! Human-readable records go to stderr, so the labeled payloads the CLI
//! prints on stdout can be piped. With `logging.local_enabled` a second,
//! JSON-formatted layer writes rolling files under `logging.local_path`.
//!
//! Log records carry entity types, counts and request ids. They never carry
//! detected values, labels or mapping contents.

use crate::config::LoggingConfig;
use crate::domain::{CloakError, Result};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "cloak.log";

/// Keeps the background file writer alive; dropping it flushes pending records
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `log_level` when it is set.
///
/// # Errors
///
/// Returns [`CloakError::Configuration`] for an unknown level, an unusable
/// log directory, or when a subscriber is already installed.
///
/// ```no_run
/// use cloak::config::LoggingConfig;
/// use cloak::logging::init_logging;
///
/// let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
/// ```
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_filter(log_level)?;

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter.clone())
        .boxed();

    let (file, file_guard) = if config.local_enabled {
        let (writer, guard) = file_writer(config)?;
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(filter)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| CloakError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::debug!(
        level = log_level,
        file_logging = config.local_enabled,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_filter(log_level: &str) -> Result<EnvFilter> {
    let level = Level::from_str(log_level).map_err(|_| {
        CloakError::Configuration(format!(
            "Invalid log level: {log_level}. Must be one of: trace, debug, info, warn, error"
        ))
    })?;

    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cloak={}", level.as_str().to_lowercase()))))
}

fn file_writer(config: &LoggingConfig) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        CloakError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::new(
        rotation_for(&config.local_rotation),
        &config.local_path,
        LOG_FILE_PREFIX,
    );
    Ok(tracing_appender::non_blocking(appender))
}

fn rotation_for(value: &str) -> Rotation {
    match value {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("trace")]
    #[test_case("DEBUG")]
    #[test_case("Info")]
    #[test_case("warn")]
    #[test_case("error")]
    fn test_known_levels(level: &str) {
        assert!(build_filter(level).is_ok());
    }

    #[test_case("chatty")]
    #[test_case("")]
    fn test_unknown_levels(level: &str) {
        let err = build_filter(level).unwrap_err();
        assert!(matches!(err, CloakError::Configuration(_)));
    }

    #[test]
    fn test_rotation_for() {
        assert_eq!(rotation_for("hourly"), Rotation::HOURLY);
        assert_eq!(rotation_for("never"), Rotation::NEVER);
        assert_eq!(rotation_for("daily"), Rotation::DAILY);
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let config = LoggingConfig {
            local_enabled: true,
            local_path: log_dir.to_string_lossy().to_string(),
            local_rotation: "never".to_string(),
        };

        let (_writer, _guard) = file_writer(&config).unwrap();
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_init_logging_rejects_bad_level() {
        assert!(init_logging("chatty", &LoggingConfig::default()).is_err());
    }
}
