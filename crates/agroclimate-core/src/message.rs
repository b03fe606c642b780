//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles and message content.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::Source;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// Each message has a unique id, a role, the message text, and the list of
/// cited sources (always empty for user messages). Messages are immutable
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within a session.
    pub id: String,
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub text: String,
    /// Sources cited by an assistant message, deduplicated by locator.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
}

impl Message {
    /// Creates a user message with the literal submitted text.
    pub fn user(text: impl Into<String>) -> Self {
        Self::create(Role::User, "user", text.into(), Vec::new())
    }

    /// Creates an assistant message with answer text and cited sources.
    pub fn assistant(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self::create(Role::Assistant, "model", text.into(), sources)
    }

    /// Creates an assistant error message with no sources.
    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self::create(Role::Assistant, "error", text.into(), Vec::new())
    }

    /// Creates a message with an explicit id, used for fixed messages such
    /// as the session welcome.
    pub fn with_id(id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            sources: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn create(role: Role, prefix: &str, text: String, sources: Vec<Source>) -> Self {
        Self {
            id: format!("{prefix}-{}", Uuid::new_v4()),
            role,
            text,
            sources,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// True when this message is an assistant turn with at least one source.
    pub fn has_sources(&self) -> bool {
        self.role == Role::Assistant && !self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_carry_no_sources() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "hello");
        assert!(msg.sources.is_empty());
        assert!(!msg.has_sources());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("x");
        let b = Message::user("x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn assistant_message_reports_sources() {
        let msg = Message::assistant(
            "answer",
            vec![Source::new("http://example.org/data", "Dataset")],
        );
        assert!(msg.has_sources());
    }
}
