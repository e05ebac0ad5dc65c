mod langfuse_tracer;
mod litellm_client;
mod mock_transport;
mod noop_tracer;
mod traced_transport;

pub use langfuse_tracer::*;
pub use litellm_client::*;
pub use mock_transport::*;
pub use noop_tracer::*;
pub use traced_transport::*;
