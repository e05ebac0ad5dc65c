use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::application::ChatTransport;
use crate::domain::{CompletionResponse, DomainError, Transcript};

/// Typing this (case-insensitive, surrounding whitespace ignored) ends the chat.
pub const EXIT_SENTINEL: &str = "sair";
pub const PROMPT: &str = "Você: ";
pub const WELCOME: &str = "Bem-vindo ao ChatBot! Digite 'sair' para encerrar.";
pub const FAREWELL: &str = "Encerrando o chat.";
pub const GENERIC_FAILURE: &str = "Erro ao obter resposta do modelo.";

pub fn is_exit_command(input: &str) -> bool {
    input.trim().to_lowercase() == EXIT_SENTINEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Calling,
    Terminated,
}

/// What happened to one line of user input.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The exit sentinel was typed. No request was sent.
    Exit,
    /// The gateway answered and the reply was appended to the transcript.
    Replied(String),
    /// The gateway answered with JSON that has no `choices[0].message.content`.
    MalformedReply(CompletionResponse),
    /// Non-200 status or a transport-level failure.
    Failed(DomainError),
}

impl TurnOutcome {
    pub fn is_exit(&self) -> bool {
        matches!(self, TurnOutcome::Exit)
    }

    /// Text shown to the user for this outcome, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            TurnOutcome::Exit => None,
            TurnOutcome::Replied(text) => Some(format!("Bot: {text}")),
            TurnOutcome::MalformedReply(response) => Some(format!(
                "Não foi possível extrair a resposta do modelo: {response}"
            )),
            TurnOutcome::Failed(DomainError::HttpStatus { status, body }) => {
                Some(format!("Erro: {status}, {body}\n{GENERIC_FAILURE}"))
            }
            TurnOutcome::Failed(DomainError::Transport(msg)) => {
                Some(format!("Ocorreu um erro: {msg}\n{GENERIC_FAILURE}"))
            }
            TurnOutcome::Failed(e) => Some(format!("Ocorreu um erro: {e}\n{GENERIC_FAILURE}")),
        }
    }
}

/// The interactive conversation loop.
///
/// Owns the transcript for the whole process lifetime. A user turn is appended
/// before every call; an assistant turn only after a reply was extracted, so a
/// failed call leaves the transcript ending on the user turn.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    transcript: Transcript,
    state: SessionState,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            transcript: Transcript::new(),
            state: SessionState::AwaitingInput,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Process one line of input and return to `AwaitingInput`, or move to
    /// `Terminated` on the exit sentinel.
    pub async fn handle_input(&mut self, input: &str) -> TurnOutcome {
        if self.state == SessionState::Terminated || is_exit_command(input) {
            self.state = SessionState::Terminated;
            return TurnOutcome::Exit;
        }

        self.transcript.push_user(input);
        self.state = SessionState::Calling;
        debug!(
            "Sending {} turns to model {}",
            self.transcript.len(),
            self.transport.model_name()
        );

        let result = self.transport.send(self.transcript.turns()).await;
        self.state = SessionState::AwaitingInput;

        match result {
            Ok(response) => match response.assistant_text() {
                Some(text) => {
                    let text = text.to_string();
                    self.transcript.push_assistant(text.clone());
                    TurnOutcome::Replied(text)
                }
                None => {
                    warn!("Gateway response has no choices[0].message.content: {response}");
                    TurnOutcome::MalformedReply(response)
                }
            },
            Err(e) => TurnOutcome::Failed(e),
        }
    }

    /// Drive the loop until the exit sentinel or end of input, then wait for
    /// the transport's pending side work.
    ///
    /// Only I/O errors on `reader`/`writer` end the loop early.
    pub async fn run<R, W>(&mut self, reader: R, writer: &mut W) -> Result<(), DomainError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .write_all(format!("{WELCOME}\n\n").as_bytes())
            .await?;

        let mut lines = reader.lines();
        while self.state != SessionState::Terminated {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                info!("Input closed, ending chat");
                writer.write_all(b"\n").await?;
                self.state = SessionState::Terminated;
                break;
            };

            let outcome = self.handle_input(&line).await;
            if outcome.is_exit() {
                writer.write_all(format!("{FAREWELL}\n").as_bytes()).await?;
            } else if let Some(text) = outcome.render() {
                writer.write_all(format!("{text}\n").as_bytes()).await?;
            }
        }

        writer.flush().await?;
        self.transport.flush().await;
        info!("Chat ended after {} turns", self.transcript.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connector::{MockTransport, ScriptedReply};
    use crate::domain::Role;

    fn reply(text: &str) -> ScriptedReply {
        ScriptedReply::Json(json!({"choices": [{"message": {"content": text}}]}))
    }

    fn session_with(script: Vec<ScriptedReply>) -> (ChatSession, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::with_script(script));
        (ChatSession::new(transport.clone()), transport)
    }

    async fn run_with_input(session: &mut ChatSession, input: &str) -> String {
        let mut output = Vec::new();
        session
            .run(input.as_bytes(), &mut output)
            .await
            .expect("session run");
        String::from_utf8(output).expect("utf8 output")
    }

    #[test]
    fn test_exit_command_matching() {
        assert!(is_exit_command("sair"));
        assert!(is_exit_command("SAIR"));
        assert!(is_exit_command(" sair "));
        assert!(is_exit_command("Sair\t"));
        assert!(!is_exit_command("sair agora"));
        assert!(!is_exit_command(""));
    }

    #[tokio::test]
    async fn test_successful_calls_alternate_roles() {
        let (mut session, transport) =
            session_with(vec![reply("um"), reply("dois"), reply("três")]);

        for input in ["a", "b", "c"] {
            let outcome = session.handle_input(input).await;
            assert!(matches!(outcome, TurnOutcome::Replied(_)));
        }

        let turns = session.transcript().turns();
        assert_eq!(turns.len(), 6);
        for (i, turn) in turns.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
        assert_eq!(transport.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_each_call_sees_prior_transcript_plus_new_user_turn() {
        let (mut session, transport) = session_with(vec![
            reply("Oi!"),
            ScriptedReply::Status(500, "Internal Error".into()),
            reply("Tudo bem"),
        ]);

        session.handle_input("Olá").await;
        session.handle_input("Como vai?").await;
        session.handle_input("Ainda aí?").await;

        let requests = transport.requests().await;
        assert_eq!(requests[0].len(), 1);
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[1][..2], session.transcript().turns()[..2]);
        assert_eq!(requests[2].len(), 4);
        assert_eq!(requests[2][2].content(), "Como vai?");
        assert_eq!(requests[2][3].content(), "Ainda aí?");
        assert!(session.transcript().replies_follow_users());
    }

    #[tokio::test]
    async fn test_http_failure_appends_only_user_turn() {
        let (mut session, _) =
            session_with(vec![ScriptedReply::Status(500, "Internal Error".into())]);

        let outcome = session.handle_input("Olá").await;
        let rendered = outcome.render().unwrap();

        assert!(rendered.contains("Erro: 500"));
        assert!(rendered.contains("Internal Error"));
        assert!(rendered.ends_with(GENERIC_FAILURE));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_network_failure_matches_http_failure_growth() {
        let (mut session, _) =
            session_with(vec![ScriptedReply::Network("connection refused".into())]);

        let outcome = session.handle_input("Olá").await;

        assert!(matches!(&outcome, TurnOutcome::Failed(e) if e.is_transport()));
        assert_eq!(
            outcome.render().unwrap(),
            format!("Ocorreu um erro: connection refused\n{GENERIC_FAILURE}")
        );
        assert_eq!(session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported_with_raw_payload() {
        let (mut session, _) = session_with(vec![ScriptedReply::Json(json!({}))]);

        let outcome = session.handle_input("Olá").await;

        assert_eq!(
            outcome.render().unwrap(),
            "Não foi possível extrair a resposta do modelo: {}"
        );
        assert_eq!(session.transcript().len(), 1);
        assert!(session.transcript().last().unwrap().is_user());
    }

    #[tokio::test]
    async fn test_sentinel_variants_send_nothing() {
        for sentinel in ["sair", "SAIR", " sair "] {
            let (mut session, transport) = session_with(vec![]);
            let outcome = session.handle_input(sentinel).await;

            assert!(outcome.is_exit());
            assert_eq!(session.state(), SessionState::Terminated);
            assert!(session.transcript().is_empty());
            assert_eq!(transport.request_count().await, 0);
        }
    }

    #[tokio::test]
    async fn test_run_renders_conversation() {
        let (mut session, _) = session_with(vec![reply("Oi!")]);

        let output = run_with_input(&mut session, "Olá\nsair\n").await;

        assert!(output.starts_with(WELCOME));
        assert!(output.contains("Você: Bot: Oi!\n"));
        assert!(output.ends_with("Você: Encerrando o chat.\n"));
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_at_end_of_input() {
        let (mut session, transport) = session_with(vec![reply("Oi!")]);

        let output = run_with_input(&mut session, "Olá").await;

        assert!(!output.contains(FAREWELL));
        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(transport.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_no_input_after_sentinel_is_processed() {
        let (mut session, transport) = session_with(vec![reply("never")]);

        run_with_input(&mut session, "sair\nOlá\n").await;

        assert_eq!(transport.request_count().await, 0);
        assert!(session.transcript().is_empty());
    }
}
