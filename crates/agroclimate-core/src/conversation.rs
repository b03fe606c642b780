//! Append-only conversation store.

use crate::message::{Message, Role};

/// Fixed id of the synthetic welcome message seeding every session.
pub const WELCOME_MESSAGE_ID: &str = "welcome-message";

const WELCOME_TEXT: &str = "Welcome to the AgroClimate Data-Gov India Analyst.

I can answer complex questions about India's agricultural economy and its relationship with climate patterns, sourcing information directly from the live data.gov.in portal.

Here are some sample questions you can ask:

- *Compare the average annual rainfall in Maharashtra and Karnataka for the last 5 available years. In parallel, list the top 3 most produced food grains in each of those states during the same period, citing all data sources.*
- *Identify the district in Uttar Pradesh with the highest wheat production in the most recent year available.*
- *Analyze the production trend of rice in West Bengal over the last decade and correlate this with rainfall data.*";

/// An ordered, append-only sequence of messages for one session.
///
/// Seeded with exactly one welcome message at construction. There are no
/// deletion or mutation operations; message order is strictly append order.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation containing only the welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::with_id(
                WELCOME_MESSAGE_ID,
                Role::Assistant,
                WELCOME_TEXT,
            )],
        }
    }

    /// Appends a message to the end of the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_conversation_holds_only_the_welcome_message() {
        let conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        let welcome = &conversation.messages()[0];
        assert_eq!(welcome.id, WELCOME_MESSAGE_ID);
        assert_eq!(welcome.role, Role::Assistant);
        assert!(welcome.text.contains("AgroClimate Data-Gov India Analyst"));
    }

    #[test]
    fn push_preserves_append_order() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("first"));
        conversation.push(Message::user("second"));
        let texts: Vec<&str> = conversation
            .messages()
            .iter()
            .skip(1)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
