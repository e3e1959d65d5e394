//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs with rotation
//! - Configurable log levels (overridable with `RUST_LOG`)
//! - Human-readable console output
//!
//! Plaintext PII never reaches a log line. Log entity types, labels, counts
//! and hashes instead.
//!
//! # Example
//!
//! ```no_run
//! use cloak::logging::init_logging;
//! use cloak::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Proxy started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a forwarded request
///
/// # Example
///
/// ```no_run
/// use cloak::log_forward_start;
///
/// let request_id = uuid::Uuid::new_v4();
/// log_forward_start!(request_id, "gpt-4o-mini");
/// ```
#[macro_export]
macro_rules! log_forward_start {
    ($request_id:expr, $model:expr) => {
        tracing::info!(
            request_id = %$request_id,
            model = %$model,
            "Forwarding chat-completion request"
        );
    };
}

/// Log the completion of a forwarded request
///
/// # Example
///
/// ```no_run
/// use cloak::log_forward_complete;
/// use std::time::Duration;
///
/// let request_id = uuid::Uuid::new_v4();
/// log_forward_complete!(request_id, 3, 2, Duration::from_millis(840));
/// ```
#[macro_export]
macro_rules! log_forward_complete {
    ($request_id:expr, $substitutions:expr, $restored:expr, $duration:expr) => {
        tracing::info!(
            request_id = %$request_id,
            substitutions = $substitutions,
            restored = $restored,
            duration_ms = $duration.as_millis() as u64,
            "Forwarded request completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cloak::log_error_with_context;
///
/// let error = "connection refused";
/// log_error_with_context!(error, "upstream call");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
