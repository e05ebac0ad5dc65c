pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    is_exit_command, ChatSession, ChatTransport, SessionState, TraceSink, TurnOutcome,
    EXIT_SENTINEL,
};

pub use connector::{
    Container, ContainerConfig, LangfuseTracer, LiteLlmClient, MockTransport, NoopTracer,
    ScriptedReply, TracedTransport,
};

pub use domain::{
    ChatConfig, CompletionRequest, CompletionResponse, DomainError, Generation, GenerationSpan,
    Role, TraceConfig, Transcript, Turn,
};
