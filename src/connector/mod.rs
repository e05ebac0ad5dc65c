//! # Connector Layer
//!
//! External integrations implementing the application traits:
//! - Gateway transport (LiteLLM over HTTP, scripted mock for offline use)
//! - Trace sinks (Langfuse ingestion API, no-op)
//! - The tracing decorator that joins the two

pub mod adapter;
mod container;

pub use adapter::*;
pub use container::*;
