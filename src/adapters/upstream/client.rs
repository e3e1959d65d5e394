//! reqwest-backed chat-completion client

use super::ChatBackend;
use crate::config::UpstreamConfig;
use crate::domain::{CloakError, Result, TransportError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;

/// Upper bound on how much of an error body ends up in an error message
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for an OpenAI-compatible chat-completion endpoint
///
/// # Example
///
/// ```no_run
/// use cloak::adapters::upstream::{ChatBackend, UpstreamClient};
/// use cloak::config::UpstreamConfig;
///
/// # async fn example() -> cloak::domain::Result<()> {
/// let client = UpstreamClient::new(&UpstreamConfig::default())?;
/// let body = serde_json::json!({"model": "m", "messages": []});
/// let response = client.complete(&body).await?;
/// # Ok(())
/// # }
/// ```
pub struct UpstreamClient {
    url: String,
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Build a client from the `[upstream]` section
    ///
    /// # Errors
    ///
    /// Returns [`CloakError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the upstream API");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            CloakError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            url: config.url.clone(),
            client,
            config: config.clone(),
        })
    }

    /// Endpoint this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn auth_header_value(&self) -> Option<String> {
        self.config
            .api_key
            .as_ref()
            .map(|key| format!("Bearer {}", key.expose_secret()))
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}

fn status_error(status: StatusCode, body: String) -> TransportError {
    let mut message = body;
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }

    if status.is_server_error() {
        TransportError::ServerError {
            status: status.as_u16(),
            message,
        }
    } else {
        TransportError::ClientError {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ChatBackend for UpstreamClient {
    async fn complete(&self, request: &Value) -> std::result::Result<Value, TransportError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(auth) = self.auth_header_value() {
            builder = builder.header("Authorization", auth);
        }

        tracing::debug!(url = %self.url, "Sending request upstream");
        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Upstream rejected request");
            return Err(status_error(status, body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else {
                    TransportError::InvalidResponse(e.to_string())
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use serde_json::json;

    fn config_for(url: String) -> UpstreamConfig {
        UpstreamConfig {
            url,
            api_key: Some(secret_string("sk-test".to_string())),
            timeout_seconds: 5,
            tls_verify: true,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(json!({"model": "m"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
            .create_async()
            .await;

        let client =
            UpstreamClient::new(&config_for(format!("{}/v1/chat/completions", server.url())))
                .unwrap();
        let response = client
            .complete(&json!({"model": "m", "messages": []}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response["choices"][0]["message"]["content"], "ok");
    }

    #[tokio::test]
    async fn test_status_codes_map_to_transport_errors() {
        let mut server = mockito::Server::new_async().await;
        let _unavailable = server
            .mock("POST", "/server")
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;
        let _unauthorized = server
            .mock("POST", "/client")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let server_err = UpstreamClient::new(&config_for(format!("{}/server", server.url())))
            .unwrap()
            .complete(&json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            server_err,
            TransportError::ServerError { status: 503, .. }
        ));
        assert!(server_err.is_retryable());

        let client_err = UpstreamClient::new(&config_for(format!("{}/client", server.url())))
            .unwrap()
            .complete(&json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            client_err,
            TransportError::ClientError { status: 401, .. }
        ));
        assert!(!client_err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>hello</html>")
            .create_async()
            .await;

        let err = UpstreamClient::new(&config_for(format!("{}/", server.url())))
            .unwrap()
            .complete(&json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Port 9 (discard) is essentially never listening on test machines
        let err = UpstreamClient::new(&config_for("http://127.0.0.1:9/".to_string()))
            .unwrap()
            .complete(&json!({}))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_status_error_truncates_long_bodies() {
        let err = status_error(StatusCode::BAD_REQUEST, "é".repeat(600));
        match err {
            TransportError::ClientError { status, message } => {
                assert_eq!(status, 400);
                assert!(message.len() <= MAX_ERROR_BODY);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
