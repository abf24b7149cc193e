//! Completion Gateway Traits
//!
//! The session never talks HTTP directly. It hands a [`GatewayRequest`] to a
//! [`CompletionGateway`] and gets back one complete reply, or an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::conversation::{ConversationHistory, WireTurn};

/// Shown when the remote side fails without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Body of a completion request, in the gateway's wire schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    /// Full conversation so far, oldest first, ending with the new user turn
    pub history: Vec<WireTurn>,
    /// Policy plus optional catalog block
    pub system_instruction: String,
}

impl GatewayRequest {
    /// Build a request from the session history and a system instruction
    #[must_use]
    pub fn new(history: &ConversationHistory, system_instruction: impl Into<String>) -> Self {
        Self {
            history: history.to_wire(),
            system_instruction: system_instruction.into(),
        }
    }
}

/// Successful response body
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ReplyBody {
    pub reply: String,
}

/// Failure response body
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// Errors from a completion call
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The service answered with a non-success status
    #[error("{message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Error reported by the service, or the generic fallback
        message: String,
    },

    /// The request never got a response
    #[error("Could not reach the chat service: {0}")]
    Transport(String),

    /// No response within the configured timeout
    #[error("The chat service did not answer within {0:?}")]
    Timeout(Duration),

    /// The response body did not match the expected schema
    #[error("Unexpected response from the chat service: {0}")]
    Decode(String),

    /// The call was cancelled before it resolved
    #[error("Request cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Build a [`GatewayError::Remote`] from a status and raw response body.
    ///
    /// The body's `error` field is used verbatim when present and non-empty.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        Self::Remote { status, message }
    }

    /// Whether this error came from cancellation rather than a failure
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A remote completion service.
///
/// Implementations perform the outbound call and return the full reply text.
/// They must resolve promptly with [`GatewayError::Cancelled`] once `cancel`
/// fires.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Gateway name for logs
    fn name(&self) -> &str;

    /// Send the conversation and wait for the complete reply
    async fn complete(
        &self,
        request: &GatewayRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_system_instruction() {
        let mut history = ConversationHistory::new();
        history.push_user("hello");
        let request = GatewayRequest::new(&history, "be brief");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["systemInstruction"], "be brief");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][0]["parts"][0]["text"], "hello");
        assert!(json.get("system_instruction").is_none());
    }

    #[test]
    fn test_remote_error_uses_server_message_verbatim() {
        let err = GatewayError::from_response(500, r#"{"error":"Quota exceeded for model"}"#);
        assert_eq!(err.to_string(), "Quota exceeded for model");
        assert!(matches!(err, GatewayError::Remote { status: 500, .. }));
    }

    #[test]
    fn test_remote_error_falls_back_to_generic_message() {
        for body in ["", "<html>bad gateway</html>", r#"{"error":""}"#, r#"{"detail":"x"}"#] {
            let err = GatewayError::from_response(502, body);
            assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE, "body: {body}");
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(GatewayError::Cancelled.to_string(), "Request cancelled");
        assert!(GatewayError::Transport("connection refused".into())
            .to_string()
            .contains("connection refused"));
        assert!(GatewayError::Cancelled.is_cancelled());
        assert!(!GatewayError::Decode("x".into()).is_cancelled());
    }
}
