//! Domain models and types for Cloak.
//!
//! The domain layer provides:
//! - **Error types** ([`CloakError`], [`TransportError`])
//! - **Result type alias** ([`Result`])
//! - **Request model** ([`ChatCompletionRequest`]) for payloads entering the proxy
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, CloakError>`]. Anonymization
//! failures and transport failures never share a variant:
//!
//! ```rust
//! use cloak::domain::{CloakError, TransportError};
//!
//! let err: CloakError = TransportError::Timeout("30s".to_string()).into();
//! assert!(err.is_retryable());
//! assert!(!err.is_anonymization_failure());
//! ```

pub mod chat;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use chat::{ChatCompletionRequest, ChatMessage};
pub use errors::{CloakError, TransportError};
pub use result::Result;
