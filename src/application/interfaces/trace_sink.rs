use async_trait::async_trait;

use crate::domain::{DomainError, Generation};

/// Destination for finished generation spans.
///
/// Delivery is best-effort: callers log a failed `record` and move on.
#[async_trait]
pub trait TraceSink: Send + Sync {
    async fn record(&self, generation: &Generation) -> Result<(), DomainError>;

    fn name(&self) -> &str;
}
