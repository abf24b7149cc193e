//! Integration Tests for TUI + Session
//!
//! These tests drive the embedded session through [`SessionClient`] and feed
//! every update into [`DisplayState`], the same way the App does each frame,
//! using a mock gateway instead of the HTTP proxy.
//!
//! # Test Coverage
//!
//! 1. **Message Exchange**: User sends message, reply is revealed and committed
//! 2. **Failure**: Gateway error removes the user line and shows the error
//! 3. **Commands**: /help, /clear and /quit
//! 4. **Grounding**: The system instruction carries the right catalog data

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use reelchat_core::{
    ChatConfig, ChatState, CompletionGateway, GatewayError, GatewayRequest, SessionUpdate,
    ValidationError,
};
use reelchat_tui::display::{DisplayMessage, DisplayRole, DisplayState};
use reelchat_tui::session_client::SessionClient;

// ============================================================================
// Mock Gateway
// ============================================================================

/// A mock gateway that records requests and answers from a script
struct MockGateway {
    /// Replies handed out in order; the last one repeats
    replies: Vec<Result<String, GatewayError>>,
    /// Count of requests made
    request_count: Arc<AtomicUsize>,
    /// Every request seen
    requests: Arc<Mutex<Vec<GatewayRequest>>>,
}

impl MockGateway {
    fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: &GatewayRequest,
        _cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.replies.len() - 1);
        self.replies[idx].clone()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn fast_config() -> ChatConfig {
    ChatConfig {
        reveal_interval: Duration::from_millis(1),
        ..ChatConfig::default()
    }
}

/// Drive the session until idle, applying every update to the display
async fn drive(client: &mut SessionClient<MockGateway>, display: &mut DisplayState) {
    timeout(Duration::from_secs(5), async {
        while client.state() != ChatState::Idle && client.wait().await {
            for update in client.recv_all() {
                display.apply_update(update);
            }
        }
    })
    .await
    .expect("session should settle");

    for update in client.recv_all() {
        display.apply_update(update);
    }
}

// ============================================================================
// Message Exchange
// ============================================================================

#[tokio::test]
async fn test_message_exchange_renders_both_sides() {
    let gateway = MockGateway::new(vec![Ok("The Office is a 2005 comedy.".to_string())]);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("recommend a comedy").unwrap();
    drive(&mut client, &mut display).await;

    assert_eq!(
        display.messages,
        vec![
            DisplayMessage::new(DisplayRole::User, "recommend a comedy"),
            DisplayMessage::new(DisplayRole::Assistant, "The Office is a 2005 comedy."),
        ]
    );
    assert_eq!(display.chat_state, ChatState::Idle);
    assert!(display.error.is_none());
}

#[tokio::test]
async fn test_reveal_passes_through_every_prefix() {
    let gateway = MockGateway::new(vec![Ok("9.5".to_string())]);
    let mut client = SessionClient::with_gateway(gateway, fast_config());

    client.send_input("rating of breaking bad?").unwrap();
    let mut reveals = Vec::new();
    timeout(Duration::from_secs(5), async {
        while client.wait().await {
            for update in client.recv_all() {
                if let SessionUpdate::Reveal { visible } = update {
                    reveals.push(visible);
                }
            }
            if client.state() == ChatState::Idle {
                break;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(reveals, vec!["9", "9.", "9.5"]);
}

#[tokio::test]
async fn test_input_while_busy_is_rejected() {
    let gateway = MockGateway::new(vec![Ok("ok".to_string())]);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("first").unwrap();
    assert_eq!(
        client.send_input("second"),
        Err(ValidationError::Busy(ChatState::AwaitingGateway))
    );
    assert_eq!(client.send_input("   "), Err(ValidationError::Busy(ChatState::AwaitingGateway)));

    drive(&mut client, &mut display).await;
    assert_eq!(display.messages.len(), 2);
    assert_eq!(client.send_input("   "), Err(ValidationError::Empty));
}

// ============================================================================
// Failure
// ============================================================================

#[tokio::test]
async fn test_failure_removes_user_line_and_shows_error() {
    let gateway = MockGateway::new(vec![
        Err(GatewayError::Remote {
            status: 503,
            message: "The proxy is down".to_string(),
        }),
        Ok("Back again.".to_string()),
    ]);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("show me dramas").unwrap();
    drive(&mut client, &mut display).await;

    assert!(display.messages.is_empty());
    assert_eq!(display.error.as_deref(), Some("The proxy is down"));

    // The next submission clears the error and succeeds
    client.send_input("show me dramas").unwrap();
    drive(&mut client, &mut display).await;
    assert!(display.error.is_none());
    assert_eq!(display.messages.len(), 2);
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_help_clear_and_quit_commands() {
    let gateway = MockGateway::new(vec![Ok("Sure.".to_string())]);
    let requests = Arc::clone(&gateway.requests);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("/help").unwrap();
    drive(&mut client, &mut display).await;
    assert_eq!(display.messages.len(), 1);
    assert_eq!(display.messages[0].role, DisplayRole::System);
    assert!(display.messages[0].content.contains("/clear"));

    client.send_input("recommend something").unwrap();
    drive(&mut client, &mut display).await;

    client.send_input("/clear").unwrap();
    drive(&mut client, &mut display).await;
    assert_eq!(
        display.messages,
        vec![DisplayMessage::new(DisplayRole::System, "Conversation cleared")]
    );

    client.send_input("/quit").unwrap();
    drive(&mut client, &mut display).await;
    assert!(client.is_closed());
    assert!(display.closed);
    assert_eq!(client.send_input("hello"), Err(ValidationError::Closed));

    // Commands never reach the gateway
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_command_during_reveal_keeps_a_single_reply() {
    let gateway = MockGateway::new(vec![Ok("Inception is great".to_string())]);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("tell me about inception").unwrap();
    let mut steps = 0;
    timeout(Duration::from_secs(5), async {
        while steps < 5 && client.wait().await {
            for update in client.recv_all() {
                if matches!(update, SessionUpdate::Reveal { .. }) {
                    steps += 1;
                }
                display.apply_update(update);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(client.state(), ChatState::Revealing);

    client.send_input("/help").unwrap();
    drive(&mut client, &mut display).await;

    let assistant: Vec<&DisplayMessage> = display
        .messages
        .iter()
        .filter(|m| m.role == DisplayRole::Assistant)
        .collect();
    assert_eq!(
        assistant,
        vec![&DisplayMessage::new(DisplayRole::Assistant, "Inception is great")]
    );
    assert!(!display.is_revealing());
    assert!(display
        .messages
        .iter()
        .any(|m| m.role == DisplayRole::System && m.content.contains("/help")));
}

// ============================================================================
// Grounding
// ============================================================================

#[tokio::test]
async fn test_requests_carry_history_and_grounding() {
    let gateway = MockGateway::new(vec![Ok("It is about chess.".to_string())]);
    let requests = Arc::clone(&gateway.requests);
    let count = Arc::clone(&gateway.request_count);
    let mut client = SessionClient::with_gateway(gateway, fast_config());
    let mut display = DisplayState::new();

    client.send_input("what is queen's gambit about").unwrap();
    drive(&mut client, &mut display).await;
    client.send_input("what is the capital of France?").unwrap();
    drive(&mut client, &mut display).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
    let requests = requests.lock().unwrap();

    let first = &requests[0];
    assert_eq!(first.history.len(), 1);
    assert!(first.system_instruction.contains("CATALOG DATA:"));
    assert!(first.system_instruction.contains("Queen's Gambit"));
    assert!(!first.system_instruction.contains("Breaking Bad"));

    let second = &requests[1];
    assert_eq!(second.history.len(), 3);
    assert!(!second.system_instruction.contains("CATALOG DATA:"));
}
