use async_trait::async_trait;

use crate::domain::{CompletionResponse, DomainError, Turn};

/// Sends a conversation to a chat-completions endpoint.
///
/// Implementors own transport, serialization, and credentials. A successful
/// call only promises that the endpoint answered with JSON; extracting the
/// reply is left to the caller.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, messages: &[Turn]) -> Result<CompletionResponse, DomainError>;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;

    /// Wait for side work started by earlier calls (trace delivery) to finish.
    async fn flush(&self) {}
}
