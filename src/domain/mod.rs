//! # Domain Layer
//!
//! Conversation models, configuration, and the error taxonomy.
//! This layer performs no I/O and knows nothing about HTTP or tracing backends.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
