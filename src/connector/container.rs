use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ChatSession, ChatTransport, TraceSink};
use crate::domain::{ChatConfig, DomainError};

use super::{LangfuseTracer, LiteLlmClient, MockTransport, NoopTracer, TracedTransport};

pub struct ContainerConfig {
    pub chat: ChatConfig,
    /// Answer from the in-process echo transport instead of the gateway.
    pub mock_gateway: bool,
}

/// Builds the transport stack once at startup and hands out sessions.
pub struct Container {
    transport: Arc<dyn ChatTransport>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self, DomainError> {
        let gateway: Arc<dyn ChatTransport> = if config.mock_gateway {
            info!("Using mock gateway (echo replies)");
            Arc::new(MockTransport::new())
        } else {
            let client = LiteLlmClient::new(&config.chat)?;
            debug!(
                "Using gateway {} with model {}",
                client.endpoint(),
                config.chat.model_name()
            );
            Arc::new(client)
        };

        let trace = config.chat.trace();
        let sink: Arc<dyn TraceSink> = if trace.is_enabled() {
            match LangfuseTracer::new(trace) {
                Ok(tracer) => {
                    debug!("Recording generations to {}", tracer.endpoint());
                    Arc::new(tracer)
                }
                Err(e) => {
                    warn!("Failed to initialize Langfuse tracer: {e}. Continuing without tracing.");
                    Arc::new(NoopTracer::new())
                }
            }
        } else {
            debug!("Tracing disabled");
            Arc::new(NoopTracer::new())
        };

        let transport: Arc<dyn ChatTransport> = Arc::new(TracedTransport::new(gateway, sink));
        Ok(Self { transport, config })
    }

    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    pub fn session(&self) -> ChatSession {
        ChatSession::new(self.transport())
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config.chat
    }
}
