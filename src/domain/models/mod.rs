mod completion;
mod config;
mod generation;
mod transcript;
mod turn;

pub use completion::*;
pub use config::*;
pub use generation::*;
pub use transcript::*;
pub use turn::*;
