//! Domain error types
//!
//! This module defines the error hierarchy for Cloak. Anonymization failures and
//! downstream transport failures are kept in separate variants because they call
//! for different retry policies: a detection error is never retried, a transport
//! error may be retried by the caller.

use thiserror::Error;

/// Main Cloak error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum CloakError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A detector or caller handed the engine malformed spans
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A span detector failed, the payload could not be anonymized
    #[error("Detection error: {0}")]
    Detection(String),

    /// The downstream chat-completion API failed or rejected the request
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl CloakError {
    /// Whether a caller may retry the operation that produced this error
    ///
    /// Only transport errors are ever retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            CloakError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether this error originated on the anonymization side of the proxy
    pub fn is_anonymization_failure(&self) -> bool {
        matches!(self, CloakError::InvalidInput(_) | CloakError::Detection(_))
    }
}

/// Errors raised while talking to the downstream chat-completion API
///
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to connect to the upstream server
    #[error("Failed to connect to upstream: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// The response body was not the JSON we expected
    #[error("Invalid response from upstream: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Connection failures, timeouts, 5xx and 429 may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed(_) | TransportError::Timeout(_) => true,
            TransportError::ServerError { .. } => true,
            TransportError::ClientError { status, .. } => *status == 429,
            TransportError::InvalidResponse(_) => false,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::ServerError { status, .. }
            | TransportError::ClientError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CloakError {
    fn from(err: std::io::Error) -> Self {
        CloakError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CloakError {
    fn from(err: serde_json::Error) -> Self {
        CloakError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CloakError {
    fn from(err: toml::de::Error) -> Self {
        CloakError::Configuration(format!("TOML parse error: {err}"))
    }
}
