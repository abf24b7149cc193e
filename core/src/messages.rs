//! Session Messages
//!
//! Updates sent from the chat session to the presentation surface. The
//! surface renders what it is told; it keeps no business logic of its own.

use serde::{Deserialize, Serialize};

/// Orchestration state of a chat session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    /// Ready for input
    Idle,
    /// A gateway call is outstanding
    AwaitingGateway,
    /// A reply is being revealed
    Revealing,
}

impl ChatState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::AwaitingGateway => "Thinking...",
            Self::Revealing => "Typing...",
        }
    }

    /// Whether a new submission would be accepted in this state
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Severity of a notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Something the user should look at
    Warning,
    /// Something failed
    Error,
}

/// Messages from the session to the surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionUpdate {
    /// The session changed state
    State {
        /// New state
        state: ChatState,
    },

    /// A user turn was appended optimistically
    UserMessage {
        /// Submitted text
        text: String,
    },

    /// The last user turn was rolled back after a failed call
    UserMessageRetracted,

    /// The visible part of the reply being revealed
    Reveal {
        /// Visible prefix
        visible: String,
    },

    /// A model turn was committed to history
    ModelMessage {
        /// Full reply text
        text: String,
    },

    /// A notice for the user (errors, help text)
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Text to display
        message: String,
    },

    /// History was cleared
    Cleared,

    /// The session was torn down
    Closed,
}
