use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};

use crate::application::{ChatTransport, TraceSink};
use crate::domain::{
    CompletionResponse, DomainError, GenerationSpan, Turn, MAX_TOKENS, TEMPERATURE,
};

pub const GENERATION_SPAN_NAME: &str = "llm-call";

/// Wraps a [`ChatTransport`] so every call is recorded as a `generation`
/// observation, and is itself a [`ChatTransport`] with the same contract.
///
/// The span opens before the inner call and closes after it, whatever the
/// outcome. The finished generation is delivered on a background task so the
/// inner result returns as soon as the gateway answers; a failing sink is
/// logged and otherwise ignored. [`ChatTransport::flush`] waits for pending
/// deliveries.
pub struct TracedTransport {
    inner: Arc<dyn ChatTransport>,
    sink: Arc<dyn TraceSink>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TracedTransport {
    pub fn new(inner: Arc<dyn ChatTransport>, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            inner,
            sink,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub async fn pending_deliveries(&self) -> usize {
        let mut pending = self.pending.lock().await;
        pending.retain(|handle| !handle.is_finished());
        pending.len()
    }
}

#[async_trait]
impl ChatTransport for TracedTransport {
    async fn send(&self, messages: &[Turn]) -> Result<CompletionResponse, DomainError> {
        let input = serde_json::to_value(messages).unwrap_or_else(|_| json!([]));
        let span = GenerationSpan::start(
            GENERATION_SPAN_NAME,
            self.inner.model_name(),
            json!({ "max_tokens": MAX_TOKENS, "temperature": TEMPERATURE }),
            input,
        );

        let log_span = info_span!(
            "llm-call",
            kind = "generation",
            id = %span.id(),
            model = %self.inner.model_name(),
            turns = messages.len(),
        );
        let result = self.inner.send(messages).instrument(log_span).await;

        let generation = span.finish(&result);
        let sink = Arc::clone(&self.sink);
        let delivery = tokio::spawn(async move {
            if let Err(e) = sink.record(&generation).await {
                warn!("Trace delivery to {} failed: {e}", sink.name());
            }
        });

        let mut pending = self.pending.lock().await;
        pending.retain(|handle| !handle.is_finished());
        pending.push(delivery);

        result
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = self.pending.lock().await.drain(..).collect();
        if handles.is_empty() {
            return;
        }
        debug!("Waiting for {} trace deliveries", handles.len());
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Trace delivery task failed: {e}");
            }
        }
    }
}
