//! Session data structures

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::window::WindowConfig;
use crate::utils::truncate_message;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat message, serialized in the `{role, content}` shape backends expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Copy of this message with content shortened to `max_chars`
    pub fn truncated(&self, max_chars: usize) -> Self {
        Self {
            role: self.role,
            content: truncate_message(&self.content, max_chars),
        }
    }
}

/// A conversation session
///
/// The log is append-only: entries are never edited or removed once pushed.
/// Only the derived context window is lossy.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier
    pub id: Uuid,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    messages: Vec<Message>,
    identity_index: Option<usize>,
    window: WindowConfig,
}

impl Session {
    /// Create an empty session
    pub fn new(window: WindowConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
            identity_index: None,
            window,
        }
    }

    /// Create a session seeded with a system-role identity message
    pub fn with_identity(window: WindowConfig, identity: impl Into<String>) -> Self {
        let mut session = Self::new(window);
        session.messages.push(Message::system(identity));
        session.identity_index = Some(0);
        session
    }

    /// Append a user turn. Only empty input is rejected; length is unbounded.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> crate::Result<()> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(crate::Error::Validation(
                "user message must not be empty".to_string(),
            ));
        }
        self.push(Message::user(text));
        Ok(())
    }

    /// Append an assistant turn
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.push(Message::assistant(text));
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full message log, oldest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages meant for display (system entries skipped)
    pub fn visible_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// The identity message, if the session was seeded with one
    pub fn identity(&self) -> Option<&Message> {
        self.identity_index.and_then(|i| self.messages.get(i))
    }

    /// Time since the session was created
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    pub fn window_config(&self) -> &WindowConfig {
        &self.window
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Build the bounded context window sent to the backend.
    ///
    /// Takes the last `window_size` messages, truncates each to
    /// `max_message_chars`, and prepends the identity message when it has
    /// scrolled out of that range.
    pub fn build_context_window(&self) -> Vec<Message> {
        let WindowConfig {
            window_size,
            max_message_chars,
        } = self.window;

        let start = self.messages.len().saturating_sub(window_size);
        let mut window = Vec::with_capacity(window_size + 1);

        if let Some(index) = self.identity_index {
            if index < start {
                window.push(self.messages[index].truncated(max_message_chars));
            }
        }

        window.extend(
            self.messages[start..]
                .iter()
                .map(|m| m.truncated(max_message_chars)),
        );
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WindowConfig {
        WindowConfig {
            window_size: 6,
            max_message_chars: 800,
        }
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new(config());
        assert!(session.is_empty());
        assert!(session.identity().is_none());
        assert!(session.build_context_window().is_empty());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = Session::new(config());
        let b = Session::new(config());
        assert_ne!(a.id, b.id);
        assert!(a.age() >= Duration::zero());
    }

    #[test]
    fn test_append_turns() {
        let mut session = Session::new(config());
        session.append_user_turn("Hello").unwrap();
        session.append_assistant_turn("Hi there!");

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_append_rejects_blank_input() {
        let mut session = Session::new(config());
        assert!(session.append_user_turn("").is_err());
        assert!(session.append_user_turn("   \n").is_err());
        assert!(session.is_empty());
    }

    #[test]
    fn test_append_keeps_long_input_whole() {
        let mut session = Session::new(config());
        let long = "x".repeat(5_000);
        session.append_user_turn(long.clone()).unwrap();
        assert_eq!(session.messages()[0].content, long);
    }

    #[test]
    fn test_window_takes_most_recent() {
        let mut session = Session::new(config());
        for i in 0..10 {
            session.append_user_turn(format!("Message {}", i)).unwrap();
        }

        let window = session.build_context_window();
        assert_eq!(window.len(), 6);
        assert_eq!(window[0].content, "Message 4");
        assert_eq!(window[5].content, "Message 9");
    }

    #[test]
    fn test_window_prepends_scrolled_out_identity() {
        let mut session = Session::with_identity(config(), "You are SoulBot.");
        for i in 0..8 {
            session.append_user_turn(format!("Message {}", i)).unwrap();
        }

        let window = session.build_context_window();
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], Message::system("You are SoulBot."));
        assert_eq!(window[1].content, "Message 2");
    }

    #[test]
    fn test_window_does_not_duplicate_identity_in_range() {
        let mut session = Session::with_identity(config(), "You are SoulBot.");
        session.append_user_turn("Hi").unwrap();
        session.append_assistant_turn("Hello!");

        let window = session.build_context_window();
        assert_eq!(window.len(), 3);
        assert_eq!(
            window.iter().filter(|m| m.role == Role::System).count(),
            1
        );
    }

    #[test]
    fn test_window_truncates_each_message() {
        let mut session = Session::new(config());
        for _ in 0..7 {
            session.append_user_turn("z".repeat(2_000)).unwrap();
        }

        let window = session.build_context_window();
        assert_eq!(window.len(), 6);
        assert!(window.iter().all(|m| m.content.chars().count() <= 800));
        // the log itself is untouched
        assert!(session
            .messages()
            .iter()
            .all(|m| m.content.chars().count() == 2_000));
    }

    #[test]
    fn test_visible_messages_skip_system() {
        let mut session = Session::with_identity(config(), "identity");
        session.append_user_turn("Hi").unwrap();
        let visible: Vec<_> = session.visible_messages().collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].role, Role::User);
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
