mod chat_transport;
mod trace_sink;

pub use chat_transport::*;
pub use trace_sink::*;
