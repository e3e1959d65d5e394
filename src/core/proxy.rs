//! Forwarding proxy
//!
//! Strips PII from a chat-completion request, sends the labeled request to the
//! downstream API and puts the real values back into the response.

use crate::adapters::upstream::{ChatBackend, UpstreamClient};
use crate::anonymization::detector::{CompositeDetector, SpanDetector};
use crate::anonymization::{AnonymizationConfig, AnonymizationEngine, AnonymizationStats};
use crate::config::CloakConfig;
use crate::domain::{ChatCompletionRequest, CloakError, Result};
use crate::{log_error_with_context, log_forward_complete, log_forward_start};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Top-level request fields that may carry end-user identifiers
const IDENTITY_FIELDS: [&str; 2] = ["user", "session_id"];

/// Result of one forwarded request
#[derive(Debug, Clone)]
pub struct ForwardReport {
    /// Identifier used in the log lines for this request
    pub request_id: Uuid,

    /// Response with labels replaced by real values
    pub response: Value,

    /// Anonymization counters for this request only
    pub stats: AnonymizationStats,

    /// Wall-clock time including the upstream call
    pub duration: Duration,
}

/// Anonymize, forward, deanonymize
///
/// The detector and the backend are shared between requests. Every request
/// gets a fresh [`AnonymizationEngine`], so labels never leak from one
/// request into another.
///
/// # Example
///
/// ```no_run
/// use cloak::config::load_config;
/// use cloak::core::ForwardingProxy;
/// use serde_json::json;
///
/// # async fn example() -> cloak::domain::Result<()> {
/// let config = load_config("cloak.toml")?;
/// let proxy = ForwardingProxy::from_config(&config)?;
///
/// let response = proxy
///     .forward(json!({
///         "model": "gpt-4o-mini",
///         "messages": [{"role": "user", "content": "Email bob@example.com"}]
///     }))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ForwardingProxy {
    detector: Arc<dyn SpanDetector>,
    anonymization: AnonymizationConfig,
    language: String,
    score_threshold: f32,
    backend: Arc<dyn ChatBackend>,
}

impl ForwardingProxy {
    /// Create a proxy from its parts
    pub fn new(
        detector: Arc<dyn SpanDetector>,
        anonymization: AnonymizationConfig,
        backend: Arc<dyn ChatBackend>,
    ) -> Self {
        Self {
            detector,
            anonymization,
            language: "en".to_string(),
            score_threshold: 0.0,
            backend,
        }
    }

    /// Set the language and score threshold passed to the detector
    pub fn with_detection_settings(mut self, language: &str, score_threshold: f32) -> Self {
        self.language = language.to_string();
        self.score_threshold = score_threshold;
        self
    }

    /// Build the detector and the upstream client described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::Configuration`] if `[upstream]` is missing or a
    /// recognizer cannot be built.
    pub fn from_config(config: &CloakConfig) -> Result<Self> {
        let upstream = config
            .require_upstream()
            .map_err(CloakError::Configuration)?;
        let backend = Arc::new(UpstreamClient::new(upstream)?);
        let detector = Arc::new(CompositeDetector::from_config(&config.detection)?);

        Ok(Self::new(detector, config.anonymization.clone(), backend).with_detection_settings(
            &config.detection.language,
            config.detection.score_threshold,
        ))
    }

    /// Forward one request and return the restored response
    ///
    /// # Errors
    ///
    /// - [`CloakError::InvalidInput`] if the payload is not a chat-completion request
    /// - [`CloakError::Detection`] if the payload could not be anonymized; nothing is sent
    /// - [`CloakError::Transport`] if the downstream API failed or rejected the request
    pub async fn forward(&self, request: Value) -> Result<Value> {
        Ok(self.forward_with_report(request).await?.response)
    }

    /// Forward one request and report what was done to it
    pub async fn forward_with_report(&self, request: Value) -> Result<ForwardReport> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();

        let parsed = ChatCompletionRequest::from_value(&request)?;
        log_forward_start!(request_id, parsed.model);

        let mut engine = self.new_engine(request_id)?;

        let labeled = anonymize_request(&mut engine, &request).inspect_err(|e| {
            log_error_with_context!(e, "anonymizing request");
        })?;

        let upstream_response = self.backend.complete(&labeled).await.map_err(|e| {
            log_error_with_context!(e, "upstream call");
            CloakError::Transport(e)
        })?;

        let response = engine.deanonymize(&upstream_response);
        let stats = engine.stats();
        let duration = started.elapsed();

        log_forward_complete!(request_id, stats.substitutions, stats.tokens_restored, duration);

        Ok(ForwardReport {
            request_id,
            response,
            stats,
            duration,
        })
    }

    fn new_engine(&self, request_id: Uuid) -> Result<AnonymizationEngine> {
        Ok(
            AnonymizationEngine::with_detector(self.anonymization.clone(), self.detector.clone())?
                .with_detection_settings(&self.language, self.score_threshold)
                .with_request_id(request_id),
        )
    }
}

/// Label message contents and identity fields, leave routing fields alone
///
/// `model`, `role` and sampling parameters are sent as they are; a model id
/// such as `gpt-4o-mini` must never come back from the detector as a secret.
fn anonymize_request(engine: &mut AnonymizationEngine, request: &Value) -> Result<Value> {
    let mut labeled = request.clone();

    if let Some(messages) = labeled.get_mut("messages").and_then(Value::as_array_mut) {
        for message in messages {
            if let Some(content) = message.get_mut("content") {
                *content = engine.anonymize(content)?;
            }
        }
    }

    for field in IDENTITY_FIELDS {
        if let Some(value) = labeled.get_mut(field) {
            if value.is_string() {
                *value = engine.anonymize(value)?;
            }
        }
    }

    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::config::DetectionConfig;
    use crate::domain::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Echoes the last user message back as the assistant reply
    #[derive(Default)]
    struct EchoBackend {
        seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn complete(&self, request: &Value) -> std::result::Result<Value, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let content = request["messages"][0]["content"].clone();
            Ok(json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
                "usage": {"total_tokens": 12}
            }))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(&self, _request: &Value) -> std::result::Result<Value, TransportError> {
            Err(TransportError::ServerError {
                status: 502,
                message: "bad gateway".to_string(),
            })
        }
    }

    fn proxy_with(backend: Arc<dyn ChatBackend>) -> ForwardingProxy {
        let detector = Arc::new(CompositeDetector::from_config(&DetectionConfig::default()).unwrap());
        ForwardingProxy::new(detector, AnonymizationConfig::default(), backend)
            .with_detection_settings("en", 0.5)
    }

    #[tokio::test]
    async fn test_forward_labels_outbound_and_restores_inbound() {
        let backend = Arc::new(EchoBackend::default());
        let proxy = proxy_with(backend.clone());

        let report = proxy
            .forward_with_report(json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "Reach me at jane@example.com"}]
            }))
            .await
            .unwrap();

        let sent = backend.seen.lock().unwrap()[0].clone();
        assert_eq!(sent["model"], "gpt-4o-mini");
        assert_eq!(sent["messages"][0]["role"], "user");
        assert_eq!(
            sent["messages"][0]["content"],
            "Reach me at <EMAIL_ADDRESS_0>"
        );
        assert_eq!(
            report.response["choices"][0]["message"]["content"],
            "Reach me at jane@example.com"
        );
        assert_eq!(report.response["usage"]["total_tokens"], 12);
        assert_eq!(report.stats.substitutions, 1);
        assert_eq!(report.stats.tokens_restored, 1);
    }

    #[tokio::test]
    async fn test_identity_fields_and_content_parts_are_labeled() {
        let backend = Arc::new(EchoBackend::default());
        let proxy = proxy_with(backend.clone());

        proxy
            .forward(json!({
                "model": "m",
                "user": "ops@example.com",
                "session_id": "s-1",
                "messages": [{
                    "role": "user",
                    "content": [{"type": "text", "text": "ping ops@example.com"}]
                }]
            }))
            .await
            .unwrap();

        let sent = backend.seen.lock().unwrap()[0].clone();
        assert_eq!(sent["user"], "<EMAIL_ADDRESS_0>");
        assert_eq!(sent["session_id"], "s-1");
        assert_eq!(sent["messages"][0]["content"][0]["type"], "text");
        assert_eq!(
            sent["messages"][0]["content"][0]["text"],
            "ping <EMAIL_ADDRESS_0>"
        );
    }

    #[tokio::test]
    async fn test_requests_do_not_share_labels() {
        let backend = Arc::new(EchoBackend::default());
        let proxy = proxy_with(backend.clone());

        for address in ["a@example.com", "b@example.com"] {
            proxy
                .forward(json!({
                    "model": "m",
                    "messages": [{"role": "user", "content": address}]
                }))
                .await
                .unwrap();
        }

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0]["messages"][0]["content"], "<EMAIL_ADDRESS_0>");
        assert_eq!(seen[1]["messages"][0]["content"], "<EMAIL_ADDRESS_0>");
    }

    #[tokio::test]
    async fn test_audit_entries_carry_forward_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let mut anonymization = AnonymizationConfig::default();
        anonymization.audit.enabled = true;
        anonymization.audit.log_path = log_path.clone();

        let detector = Arc::new(CompositeDetector::from_config(&DetectionConfig::default()).unwrap());
        let proxy = ForwardingProxy::new(detector, anonymization, Arc::new(EchoBackend::default()))
            .with_detection_settings("en", 0.5);

        let report = proxy
            .forward_with_report(json!({
                "model": "m",
                "user": "ops@example.com",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Mail ops@example.com"}
                ]
            }))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let event: Value = serde_json::from_str(line).unwrap();
            assert_eq!(event["request_id"], report.request_id.to_string());
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_as_transport() {
        let proxy = proxy_with(Arc::new(FailingBackend));
        let err = proxy
            .forward(json!({"model": "m", "messages": [{"role": "user", "content": "hi"}]}))
            .await
            .unwrap_err();

        assert!(matches!(err, CloakError::Transport(_)));
        assert!(err.is_retryable());
        assert!(!err.is_anonymization_failure());
    }

    #[tokio::test]
    async fn test_malformed_request_never_reaches_backend() {
        let backend = Arc::new(EchoBackend::default());
        let proxy = proxy_with(backend.clone());

        let err = proxy.forward(json!({"messages": []})).await.unwrap_err();
        assert!(matches!(err, CloakError::InvalidInput(_)));
        assert!(backend.seen.lock().unwrap().is_empty());
    }
}
