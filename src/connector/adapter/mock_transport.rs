use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::application::ChatTransport;
use crate::domain::{CompletionResponse, DomainError, Turn};

const MOCK_MODEL: &str = "mock-gateway";

/// One canned gateway answer.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Status 200 with this JSON body.
    Json(Value),
    /// Any other status with a text body.
    Status(u16, String),
    /// The request never reached the gateway.
    Network(String),
}

/// Offline [`ChatTransport`].
///
/// Replies are taken from a script in order. Once the script is exhausted the
/// transport echoes the last user turn back. Every conversation it receives
/// is recorded for inspection.
pub struct MockTransport {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, reply: ScriptedReply) {
        self.script.lock().await.push_back(reply);
    }

    pub async fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    fn echo(messages: &[Turn]) -> Value {
        let last = messages
            .iter()
            .rev()
            .find(|t| t.is_user())
            .map(Turn::content)
            .unwrap_or_default();
        json!({
            "model": MOCK_MODEL,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": format!("echo: {last}")},
                "finish_reason": "stop",
            }],
        })
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, messages: &[Turn]) -> Result<CompletionResponse, DomainError> {
        self.requests.lock().await.push(messages.to_vec());

        match self.script.lock().await.pop_front() {
            Some(ScriptedReply::Json(body)) => Ok(CompletionResponse::new(body)),
            Some(ScriptedReply::Status(status, body)) => Err(DomainError::http_status(status, body)),
            Some(ScriptedReply::Network(msg)) => Err(DomainError::transport(msg)),
            None => Ok(CompletionResponse::new(Self::echo(messages))),
        }
    }

    fn model_name(&self) -> &str {
        MOCK_MODEL
    }
}
