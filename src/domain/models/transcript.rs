use serde::Serialize;

use super::{Role, Turn};

/// Ordered, append-only record of the turns exchanged during one process
/// lifetime. Index order is conversation order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Turn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Turn::assistant(content));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role() == role).count()
    }

    /// True when every assistant turn directly answers the user turn before it.
    /// Consecutive user turns are allowed: a failed call leaves no placeholder.
    pub fn replies_follow_users(&self) -> bool {
        self.turns.first().map_or(true, Turn::is_user)
            && self
                .turns
                .windows(2)
                .all(|pair| pair[1].is_user() || pair[0].is_user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_appends_in_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("Olá");
        transcript.push_assistant("Oi!");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0], Turn::user("Olá"));
        assert_eq!(transcript.last(), Some(&Turn::assistant("Oi!")));
        assert_eq!(transcript.count_role(Role::User), 1);
    }

    #[test]
    fn test_consecutive_user_turns_are_valid() {
        let mut transcript = Transcript::new();
        transcript.push_user("first");
        transcript.push_user("second");
        transcript.push_assistant("reply");
        assert!(transcript.replies_follow_users());
    }

    #[test]
    fn test_leading_or_doubled_assistant_is_invalid() {
        let mut leading = Transcript::new();
        leading.push_assistant("hi");
        assert!(!leading.replies_follow_users());

        let mut doubled = Transcript::new();
        doubled.push_user("q");
        doubled.push_assistant("a");
        doubled.push_assistant("b");
        assert!(!doubled.replies_follow_users());
    }

    #[test]
    fn test_serializes_as_message_array() {
        let mut transcript = Transcript::new();
        transcript.push_user("Olá");
        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(json, serde_json::json!([{"role": "user", "content": "Olá"}]));
    }
}
