//! Conversation Store
//!
//! The ordered list of messages exchanged in a session. Messages are only ever
//! appended, except for rolling back an optimistic user turn when the gateway
//! call behind it fails.

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing
    User,
    /// The language model
    Model,
}

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "text", rename_all = "lowercase")]
pub enum Message {
    /// Submitted by the user
    User(String),
    /// Produced by the model and fully revealed
    Model(String),
}

impl Message {
    /// The author of this message
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Model(_) => Role::Model,
        }
    }

    /// The message text
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::User(text) | Self::Model(text) => text,
        }
    }
}

/// Ordered, append-only conversation history
#[derive(Clone, Debug, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::User(text.into()));
    }

    /// Append a model message
    pub fn push_model(&mut self, text: impl Into<String>) {
        self.messages.push(Message::Model(text.into()));
    }

    /// Remove the last message if it is a user message.
    ///
    /// Returns the removed text. A trailing model message is left in place.
    pub fn rollback_user(&mut self) -> Option<String> {
        match self.messages.last() {
            Some(Message::User(_)) => match self.messages.pop() {
                Some(Message::User(text)) => Some(text),
                _ => None,
            },
            _ => None,
        }
    }

    /// Drop every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages in insertion order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Convert to the gateway's wire schema
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireTurn> {
        self.messages.iter().map(WireTurn::from).collect()
    }
}

/// One turn in the gateway's `history` array
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    /// `"user"` or `"model"`
    pub role: Role,
    /// Always a single part holding the full text
    pub parts: Vec<WirePart>,
}

/// Text part of a wire turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePart {
    /// Turn text
    pub text: String,
}

impl From<&Message> for WireTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            parts: vec![WirePart {
                text: message.text().to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut history = ConversationHistory::new();
        history.push_user("hi");
        history.push_model("hello");
        history.push_user("recommend something");

        let roles: Vec<Role> = history.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Model, Role::User]);
        assert_eq!(history.last().map(Message::text), Some("recommend something"));
    }

    #[test]
    fn test_rollback_only_removes_trailing_user_message() {
        let mut history = ConversationHistory::new();
        history.push_user("first");
        history.push_model("reply");

        assert_eq!(history.rollback_user(), None);
        assert_eq!(history.len(), 2);

        history.push_user("second");
        assert_eq!(history.rollback_user(), Some("second".to_string()));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some(&Message::Model("reply".to_string())));
    }

    #[test]
    fn test_rollback_on_empty_history() {
        let mut history = ConversationHistory::new();
        assert_eq!(history.rollback_user(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn test_wire_shape_matches_gateway_schema() {
        let mut history = ConversationHistory::new();
        history.push_user("Is Inception good?");
        history.push_model("Yes, it's rated 8.8.");

        let json = serde_json::to_value(history.to_wire()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "parts": [{"text": "Is Inception good?"}]},
                {"role": "model", "parts": [{"text": "Yes, it's rated 8.8."}]}
            ])
        );
    }

    #[test]
    fn test_clear_empties_history() {
        let mut history = ConversationHistory::new();
        history.push_user("a");
        history.push_model("b");
        history.clear();
        assert!(history.is_empty());
    }
}
