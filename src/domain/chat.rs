//! Chat-completion request model
//!
//! The proxy forwards arbitrary JSON, but a request must at least look like an
//! OpenAI-compatible chat-completion call before PII is stripped from it.
//! Fields this model does not know about are kept in `extra` so that the
//! request sent downstream is the caller's request, minus PII.

use super::{CloakError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role (system, user, assistant, tool)
    pub role: String,

    /// Message text; absent for some tool-call messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    /// Optional participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OpenAI-compatible chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,

    /// Conversation so far
    pub messages: Vec<ChatMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// End-user identifier, anonymized like any other string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Any other field the caller sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionRequest {
    /// Parse and validate a request payload
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::InvalidInput`] if the payload is not a chat-completion
    /// request, has no messages, or asks for a streamed response (streamed
    /// chunks cannot be restored token by token).
    pub fn from_value(value: &Value) -> Result<Self> {
        let request: ChatCompletionRequest = serde_json::from_value(value.clone())
            .map_err(|e| CloakError::InvalidInput(format!("Not a chat-completion request: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    /// Validate the request shape
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(CloakError::InvalidInput("model cannot be empty".to_string()));
        }
        if self.messages.is_empty() {
            return Err(CloakError::InvalidInput(
                "messages cannot be empty".to_string(),
            ));
        }
        if self.stream == Some(true) {
            return Err(CloakError::InvalidInput(
                "streaming responses are not supported".to_string(),
            ));
        }
        Ok(())
    }
}
