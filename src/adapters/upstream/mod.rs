//! Downstream chat-completion API
//!
//! The [`ChatBackend`] trait is the seam between the forwarding proxy and the
//! network. [`UpstreamClient`] is the reqwest implementation; tests substitute
//! their own backends.

pub mod client;

pub use client::UpstreamClient;

use crate::domain::TransportError;
use async_trait::async_trait;
use serde_json::Value;

/// Something that can answer a chat-completion request
///
/// Implementations only ever see labeled payloads.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send an already-anonymized request and return the raw response body
    async fn complete(&self, request: &Value) -> Result<Value, TransportError>;
}
