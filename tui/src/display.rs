//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from [`SessionUpdate`]s and used for rendering.
//!
//! The TUI is a thin client: it renders what the session tells it to and keeps
//! no conversation logic of its own.
//!
//! - DisplayMessage: A rendered conversation line
//! - DisplayState: Everything the renderer needs for one frame

use reelchat_core::{ChatState, NotifyLevel, SessionUpdate};

/// A rendered conversation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
    /// Whether this message is still being revealed
    pub revealing: bool,
}

impl DisplayMessage {
    /// Create a finished display message
    pub fn new(role: DisplayRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            revealing: false,
        }
    }

    /// Create a message whose content is still being revealed
    pub fn revealing(visible: impl Into<String>) -> Self {
        Self {
            role: DisplayRole::Assistant,
            content: visible.into(),
            revealing: true,
        }
    }

    /// Mark the reveal as complete
    pub fn complete(&mut self, final_content: String) {
        self.content = final_content;
        self.revealing = false;
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// The catalog assistant
    Assistant,
    /// Notices such as `/help` output
    System,
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "Assistant: ",
            DisplayRole::System => "",
        }
    }
}

/// Complete display state
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Conversation messages
    pub messages: Vec<DisplayMessage>,
    /// Session state
    pub chat_state: ChatState,
    /// Last gateway failure, shown until the next submission
    pub error: Option<String>,
    /// Whether the session has been torn down
    pub closed: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            chat_state: ChatState::Idle,
            error: None,
            closed: false,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a [`SessionUpdate`] to update display state
    pub fn apply_update(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::State { state } => {
                self.chat_state = state;
            }
            SessionUpdate::UserMessage { text } => {
                self.error = None;
                self.messages
                    .push(DisplayMessage::new(DisplayRole::User, text));
            }
            SessionUpdate::UserMessageRetracted => {
                if let Some(pos) = self
                    .messages
                    .iter()
                    .rposition(|m| m.role == DisplayRole::User)
                {
                    self.messages.remove(pos);
                }
            }
            // Notices can land while a reply is revealing, so it is not
            // necessarily the last message
            SessionUpdate::Reveal { visible } => match self.revealing_message() {
                Some(msg) => msg.content = visible,
                None => self.messages.push(DisplayMessage::revealing(visible)),
            },
            SessionUpdate::ModelMessage { text } => match self.revealing_message() {
                Some(msg) => msg.complete(text),
                None => self
                    .messages
                    .push(DisplayMessage::new(DisplayRole::Assistant, text)),
            },
            SessionUpdate::Notify { level, message } => match level {
                NotifyLevel::Error => self.error = Some(message),
                NotifyLevel::Info | NotifyLevel::Warning => {
                    self.messages
                        .push(DisplayMessage::new(DisplayRole::System, message));
                }
            },
            SessionUpdate::Cleared => {
                self.messages.clear();
                self.error = None;
            }
            SessionUpdate::Closed => {
                self.closed = true;
            }
        }
    }

    /// Check if a reply is currently being revealed
    pub fn is_revealing(&self) -> bool {
        self.messages.iter().any(|m| m.revealing)
    }

    fn revealing_message(&mut self) -> Option<&mut DisplayMessage> {
        self.messages.iter_mut().rev().find(|m| m.revealing)
    }
}
