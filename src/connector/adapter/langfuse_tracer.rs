use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::application::TraceSink;
use crate::domain::{DomainError, Generation, TraceConfig};

const INGESTION_PATH: &str = "/api/public/ingestion";
/// Trace delivery must never hold up the chat for long.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Default)]
struct IngestionResponse {
    #[serde(default)]
    errors: Vec<Value>,
}

/// [`TraceSink`] that ships each generation to a Langfuse server through the
/// public ingestion API.
///
/// Each call becomes one trace holding a single `generation` observation.
/// Requests authenticate with HTTP basic auth (`public_key:secret_key`) and
/// use a short timeout of their own so a slow backend cannot stall the chat.
pub struct LangfuseTracer {
    client: reqwest::Client,
    public_key: String,
    secret_key: String,
    url: String,
}

impl LangfuseTracer {
    pub fn new(config: &TraceConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DELIVERY_TIMEOUT)
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| {
                DomainError::internal(format!("LangfuseTracer: failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            public_key: config.public_key().to_string(),
            secret_key: config.secret_key().to_string(),
            url: format!("{}{}", config.host().trim_end_matches('/'), INGESTION_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    /// Ingestion payload: a `trace-create` event followed by the
    /// `generation-create` event that belongs to it.
    pub fn ingestion_batch(generation: &Generation) -> Value {
        let now = Utc::now().to_rfc3339();
        let trace = json!({
            "id": Uuid::new_v4().to_string(),
            "timestamp": now,
            "type": "trace-create",
            "body": {
                "id": generation.trace_id,
                "name": generation.name,
                "timestamp": generation.start_time,
                "input": generation.input,
                "output": generation.output,
            },
        });
        let observation = json!({
            "id": Uuid::new_v4().to_string(),
            "timestamp": now,
            "type": "generation-create",
            "body": generation,
        });

        json!({
            "batch": [trace, observation],
            "metadata": {
                "sdk_name": env!("CARGO_PKG_NAME"),
                "sdk_version": env!("CARGO_PKG_VERSION"),
            },
        })
    }
}

#[async_trait]
impl TraceSink for LangfuseTracer {
    async fn record(&self, generation: &Generation) -> Result<(), DomainError> {
        let payload = Self::ingestion_batch(generation);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::trace(format!("LangfuseTracer: request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::trace(format!(
                "LangfuseTracer: ingestion returned {status}: {body}"
            )));
        }

        // 207 Multi-Status lists per-event failures in `errors`.
        let parsed: IngestionResponse = response.json().await.unwrap_or_default();
        if !parsed.errors.is_empty() {
            return Err(DomainError::trace(format!(
                "LangfuseTracer: {} event(s) rejected: {}",
                parsed.errors.len(),
                Value::Array(parsed.errors)
            )));
        }

        debug!("LangfuseTracer: recorded generation {}", generation.id);
        Ok(())
    }

    fn name(&self) -> &str {
        "langfuse"
    }
}
