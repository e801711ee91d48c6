//! HTTP client service
//!
//! Encapsulates the single POST to the upstream Responses API

use crate::config::Settings;
use crate::models::upstream::ResponsesRequest;
use crate::utils::error::ClassifiedError;
use crate::utils::logging::{truncate_content, MAX_LOGGED_PAYLOAD_CHARS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Upstream transport
///
/// One attempt per call, no retries. `Ok(None)` means a 2xx response whose
/// body was absent or not JSON.
#[async_trait]
pub trait ResponsesApi: Send + Sync {
    async fn create_response(&self, request: &ResponsesRequest) -> Result<Option<Value>, ClassifiedError>;
}

/// Responses API client
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAIClient {
    /// Create a new client instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.openai.timeout))
            .user_agent(concat!("talktome/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.openai.base_url.trim_end_matches('/').to_string(),
            api_key: settings.openai.api_key.clone(),
        })
    }

    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url)
    }
}

#[async_trait]
impl ResponsesApi for OpenAIClient {
    async fn create_response(&self, request: &ResponsesRequest) -> Result<Option<Value>, ClassifiedError> {
        let url = self.responses_url();
        debug!("Sending Responses API request to {}", url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        // Send request
        let response = builder.send().await.map_err(|e| {
            error!("Network error while calling upstream: {}", e);
            ClassifiedError::transport_failure()
        })?;

        // Check response status
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %truncate_content(&error_text, MAX_LOGGED_PAYLOAD_CHARS),
                "Upstream Responses API error"
            );
            return Err(ClassifiedError::transport_failure());
        }

        // A 2xx body that cannot be decoded goes to the normalizer as absent
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read upstream response body: {}", e);
                return Ok(None);
            }
        };

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => {
                debug!("Upstream request completed with status {}", status);
                Ok(Some(value))
            }
            Err(e) => {
                warn!(
                    body = %truncate_content(&String::from_utf8_lossy(&body), MAX_LOGGED_PAYLOAD_CHARS),
                    "Upstream body is not valid JSON: {}", e
                );
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::upstream::ResponsesInput;
    use crate::utils::error::StatusClass;
    use httpmock::prelude::*;
    use serde_json::json;

    fn create_test_settings(base_url: &str) -> Settings {
        let mut settings = Settings::default();
        settings.openai.api_key = Some("sk-test-key".to_string());
        settings.openai.base_url = base_url.to_string();
        settings.openai.timeout = 5;
        settings
    }

    fn create_test_request() -> ResponsesRequest {
        ResponsesRequest {
            model: "gpt-4o".to_string(),
            input: ResponsesInput::Text("Hello".to_string()),
            max_output_tokens: 100,
            temperature: 0.7,
            text: None,
        }
    }

    #[test]
    fn test_responses_url_trims_slash() {
        let client = OpenAIClient::new(&create_test_settings("https://api.example.com/v1/")).unwrap();
        assert_eq!(client.responses_url(), "https://api.example.com/v1/responses");
    }

    #[tokio::test]
    async fn test_success_returns_decoded_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/responses")
                    .header("authorization", "Bearer sk-test-key")
                    .json_body(json!({
                        "model": "gpt-4o",
                        "input": "Hello",
                        "max_output_tokens": 100,
                        "temperature": 0.7
                    }));
                then.status(200).json_body(json!({"output": ["Hi"]}));
            })
            .await;

        let client = OpenAIClient::new(&create_test_settings(&server.url("/v1"))).unwrap();
        let body = client.create_response(&create_test_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, Some(json!({"output": ["Hi"]})));
    }

    #[tokio::test]
    async fn test_non_success_is_transport_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/responses");
                then.status(429).body("slow down");
            })
            .await;

        let client = OpenAIClient::new(&create_test_settings(&server.url("/v1"))).unwrap();
        let err = client.create_response(&create_test_request()).await.unwrap_err();

        assert_eq!(err.class, StatusClass::TransportFailure);
    }

    #[tokio::test]
    async fn test_non_json_body_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/responses");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let client = OpenAIClient::new(&create_test_settings(&server.url("/v1"))).unwrap();
        let body = client.create_response(&create_test_request()).await.unwrap();

        assert_eq!(body, None);
    }

    #[tokio::test]
    async fn test_connection_error_is_transport_failure() {
        let client = OpenAIClient::new(&create_test_settings("http://127.0.0.1:1/v1")).unwrap();
        let err = client.create_response(&create_test_request()).await.unwrap_err();

        assert_eq!(err.class, StatusClass::TransportFailure);
    }
}
