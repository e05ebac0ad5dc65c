use async_trait::async_trait;
use tracing::debug;

use crate::application::TraceSink;
use crate::domain::{DomainError, Generation};

/// Sink used when tracing is switched off. Finished spans are only logged.
pub struct NoopTracer;

impl NoopTracer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopTracer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TraceSink for NoopTracer {
    async fn record(&self, generation: &Generation) -> Result<(), DomainError> {
        debug!(
            "Discarding generation {} ({:?})",
            generation.id, generation.level
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
