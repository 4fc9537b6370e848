//! Conversation history owned by one chat session.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when history is rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Append-only list of messages for one session.
///
/// Only completed turns are ever recorded: [`ConversationHistory::record_turn`]
/// pushes the question and its answer together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that opens with an assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self { messages: vec![Message::assistant(greeting)] }
    }

    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(Message::user(question));
        self.messages.push(Message::assistant(answer));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// One `Human: ...` / `AI: ...` line per message.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_renders_empty() {
        let history = ConversationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.render(), "");
    }

    #[test]
    fn test_record_turn_appends_pair_in_order() {
        let mut history = ConversationHistory::with_greeting("Hello!");
        history.record_turn("Welche Künstler gibt es?", "AC/DC, Accept");

        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[1], Message::user("Welche Künstler gibt es?"));
        assert_eq!(history.last(), Some(&Message::assistant("AC/DC, Accept")));
    }

    #[test]
    fn test_render_labels_roles() {
        let mut history = ConversationHistory::with_greeting("Hello!");
        history.record_turn("Name 2 artists", "AC/DC and Accept");

        assert_eq!(
            history.render(),
            "AI: Hello!\nHuman: Name 2 artists\nAI: AC/DC and Accept"
        );
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::new();
        history.record_turn("q", "a");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
