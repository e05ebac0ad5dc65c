use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::ChatTransport;
use crate::domain::{ChatConfig, CompletionRequest, CompletionResponse, DomainError, Turn};

/// HTTP client for an OpenAI-compatible chat-completions endpoint, normally a
/// LiteLLM proxy.
///
/// Every call posts the full conversation with a fixed token budget and
/// temperature. Only status 200 counts as success; the body is returned as raw
/// JSON without checking its shape.
///
/// **TLS**: certificate verification is disabled unless the configuration
/// enables it (`LITELLM_VERIFY_TLS=true` or `--verify-tls`).
///
/// **Timeout**: none unless configured. Without one a stalled gateway blocks
/// the call indefinitely.
pub struct LiteLlmClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl LiteLlmClient {
    pub fn new(config: &ChatConfig) -> Result<Self, DomainError> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_tls());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            DomainError::internal(format!("LiteLlmClient: failed to build HTTP client: {e}"))
        })?;

        if !config.verify_tls() {
            warn!(
                "TLS certificate verification is disabled for {}",
                config.gateway_url()
            );
        }

        Ok(Self {
            client,
            api_key: config.api_key().to_string(),
            model: config.model_name().to_string(),
            url: config.gateway_url().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for LiteLlmClient {
    async fn send(&self, messages: &[Turn]) -> Result<CompletionResponse, DomainError> {
        let request = CompletionRequest::new(&self.model, messages);

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LiteLlmClient: request to {} failed: {e}", self.url);
                DomainError::transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("LiteLlmClient: failed to read response body: {e}");
            DomainError::transport(e.to_string())
        })?;

        if status != StatusCode::OK {
            warn!("LiteLlmClient: gateway returned {status}: {body}");
            return Err(DomainError::http_status(status.as_u16(), body));
        }

        debug!("LiteLlmClient raw response: {body}");
        let raw: Value = serde_json::from_str(&body).map_err(|e| {
            warn!("LiteLlmClient: response is not JSON: {e}");
            DomainError::transport(format!("failed to parse response: {e}"))
        })?;

        Ok(CompletionResponse::new(raw))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
