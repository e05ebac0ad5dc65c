//! # Application Layer
//!
//! The conversation use case and the traits it talks to. Concrete transports
//! and trace backends live in the connector layer.

mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
