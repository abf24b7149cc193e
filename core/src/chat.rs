//! Chat Session - The Orchestration Core
//!
//! The session owns everything a conversation needs: the catalog, the history,
//! the pending gateway call, and the reveal scheduler. It drives the
//! send-message flow:
//!
//! ```text
//!            submit(text)                 gateway ok
//!   Idle ─────────────────► AwaitingGateway ─────────► Revealing
//!    ▲                            │                        │
//!    │      gateway error         │      reveal finished   │
//!    └────────────────────────────┴────────────────────────┘
//!      (user turn rolled back)        (model turn committed)
//! ```
//!
//! The surface forwards input through [`ChatSession::submit`] and renders the
//! [`SessionUpdate`]s it receives. Progress is made by calling
//! [`ChatSession::poll`] every frame, or by awaiting [`ChatSession::wait`].

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::catalog::Catalog;
use crate::context;
use crate::conversation::ConversationHistory;
use crate::gateway::{CompletionGateway, GatewayError, GatewayRequest};
use crate::messages::{ChatState, NotifyLevel, SessionUpdate};
use crate::prompt;
use crate::reveal::{RevealEvent, RevealScheduler, DEFAULT_REVEAL_INTERVAL};

/// Default maximum length of a single submission, in characters
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 4000;

/// Shown for `/help`
pub const HELP_TEXT: &str = "Ask about the catalog: titles, genres, directors, ratings. \
                             Commands: /help, /clear, /quit";

/// Session configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatConfig {
    /// Delay between revealed characters
    pub reveal_interval: Duration,
    /// Longest accepted submission, in characters
    pub max_input_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }
}

/// Why a submission was not accepted.
///
/// Surfaces ignore these; they are never shown as errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty or whitespace-only input
    #[error("message is empty")]
    Empty,

    /// A gateway call or reveal is already in progress
    #[error("session is busy ({})", .0.description())]
    Busy(ChatState),

    /// Input longer than the configured maximum
    #[error("message exceeds maximum length of {0} characters")]
    TooLong(usize),

    /// The session has been shut down
    #[error("session is closed")]
    Closed,
}

/// Result of the outstanding gateway call
type PendingReply = oneshot::Receiver<Result<String, GatewayError>>;

/// A single chat session
pub struct ChatSession<G: CompletionGateway> {
    /// Configuration
    config: ChatConfig,
    /// Completion gateway
    gateway: Arc<G>,
    /// Titles available for grounding
    catalog: Catalog,
    /// Conversation history
    history: ConversationHistory,
    /// Current orchestration state
    state: ChatState,
    /// Outstanding gateway call, if any
    pending: Option<PendingReply>,
    /// Reveal pacing
    reveal: RevealScheduler,
    /// Last gateway failure, for display
    last_error: Option<String>,
    /// Root token for every task this session spawns
    shutdown: CancellationToken,
    /// Set once torn down
    closed: bool,
    /// Channel to the presentation surface
    tx: mpsc::UnboundedSender<SessionUpdate>,
}

impl<G: CompletionGateway + 'static> ChatSession<G> {
    /// Create a session over the built-in catalog
    pub fn new(gateway: G, config: ChatConfig, tx: mpsc::UnboundedSender<SessionUpdate>) -> Self {
        let shutdown = CancellationToken::new();
        let reveal = RevealScheduler::new(config.reveal_interval, shutdown.clone());

        Self {
            config,
            gateway: Arc::new(gateway),
            catalog: Catalog::builtin(),
            history: ConversationHistory::new(),
            state: ChatState::Idle,
            pending: None,
            reveal,
            last_error: None,
            shutdown,
            closed: false,
            tx,
        }
    }

    /// Current state
    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Conversation so far
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The most recent gateway failure, cleared on the next submission
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The catalog used for grounding
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether [`ChatSession::shutdown`] has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Submit user text.
    ///
    /// On success the user turn is appended and the gateway call is in flight.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] and leaves the session untouched when the
    /// text is empty or too long, the session is busy, or it has been closed.
    pub fn submit(&mut self, text: &str) -> Result<(), ValidationError> {
        let text = match self.validate(text) {
            Ok(text) => text.to_string(),
            Err(reason) => {
                tracing::debug!(reason = %reason, "Submission ignored");
                return Err(reason);
            }
        };

        self.last_error = None;
        self.history.push_user(text.clone());
        self.send(SessionUpdate::UserMessage { text: text.clone() });

        let selection = context::select(&text, &self.catalog);
        let instruction = prompt::build_system_instruction(&selection.serialize());
        let request = GatewayRequest::new(&self.history, instruction);

        tracing::info!(
            gateway = self.gateway.name(),
            selection = selection.kind(),
            entries = selection.entries().len(),
            turns = self.history.len(),
            "Submitting message"
        );

        let gateway = Arc::clone(&self.gateway);
        let cancel = self.shutdown.child_token();
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = gateway.complete(&request, &cancel).await;
            // Receiver is gone if the session was torn down
            let _ = reply_tx.send(result);
        });

        self.pending = Some(reply_rx);
        self.set_state(ChatState::AwaitingGateway);
        Ok(())
    }

    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ValidationError> {
        if self.closed {
            return Err(ValidationError::Closed);
        }
        if !self.state.accepts_input() {
            return Err(ValidationError::Busy(self.state));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        if text.chars().count() > self.config.max_input_length {
            return Err(ValidationError::TooLong(self.config.max_input_length));
        }
        Ok(text)
    }

    /// Process whatever progress is ready, without waiting.
    ///
    /// Call this regularly (e.g. every frame). Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let mut activity = false;

        if let Some(rx) = self.pending.as_mut() {
            let result = match rx.try_recv() {
                Ok(result) => Some(result),
                Err(oneshot::error::TryRecvError::Empty) => None,
                Err(oneshot::error::TryRecvError::Closed) => Some(Err(GatewayError::Cancelled)),
            };
            if let Some(result) = result {
                self.pending = None;
                self.handle_gateway_result(result);
                activity = true;
            }
        }

        while let Some(event) = self.reveal.try_next_event() {
            self.handle_reveal_event(event);
            activity = true;
        }

        if self.state == ChatState::Revealing && !self.reveal.is_active() {
            tracing::warn!("Reveal ended without finishing");
            self.set_state(ChatState::Idle);
            activity = true;
        }

        activity
    }

    /// Wait for the next piece of progress: the gateway result or a reveal event.
    ///
    /// Returns false when there is nothing in flight.
    pub async fn wait(&mut self) -> bool {
        if let Some(rx) = self.pending.as_mut() {
            let result = rx.await.unwrap_or(Err(GatewayError::Cancelled));
            self.pending = None;
            self.handle_gateway_result(result);
            return true;
        }

        match self.reveal.next_event().await {
            Some(event) => {
                self.handle_reveal_event(event);
                true
            }
            None => {
                if self.state == ChatState::Revealing {
                    self.set_state(ChatState::Idle);
                }
                false
            }
        }
    }

    /// Drive the current exchange until the session is idle again
    pub async fn run_until_idle(&mut self) {
        while self.state != ChatState::Idle {
            if !self.wait().await {
                break;
            }
        }
    }

    fn handle_gateway_result(&mut self, result: Result<String, GatewayError>) {
        if self.closed {
            tracing::debug!("Ignoring gateway result after shutdown");
            return;
        }

        match result {
            Ok(reply) => {
                self.reveal.start(reply);
                self.set_state(ChatState::Revealing);
            }
            Err(err) => {
                self.history.rollback_user();
                self.send(SessionUpdate::UserMessageRetracted);

                if err.is_cancelled() {
                    tracing::debug!("Gateway call cancelled");
                } else {
                    tracing::warn!(error = %err, "Gateway call failed, rolled back user turn");
                    let message = err.to_string();
                    self.last_error = Some(message.clone());
                    self.notify(NotifyLevel::Error, message);
                }
                self.set_state(ChatState::Idle);
            }
        }
    }

    fn handle_reveal_event(&mut self, event: RevealEvent) {
        match event {
            RevealEvent::Step { visible } => {
                self.send(SessionUpdate::Reveal { visible });
            }
            RevealEvent::Finished { text } => {
                self.history.push_model(text.clone());
                self.send(SessionUpdate::ModelMessage { text });
                self.set_state(ChatState::Idle);
            }
        }
    }

    /// Empty the conversation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Busy`] unless the session is idle, or
    /// [`ValidationError::Closed`] after shutdown.
    pub fn clear_history(&mut self) -> Result<(), ValidationError> {
        if self.closed {
            return Err(ValidationError::Closed);
        }
        if !self.state.accepts_input() {
            return Err(ValidationError::Busy(self.state));
        }
        self.history.clear();
        self.last_error = None;
        self.send(SessionUpdate::Cleared);
        Ok(())
    }

    /// Route a line of surface input: `/command` lines are commands,
    /// everything else is a submission.
    ///
    /// # Errors
    ///
    /// Propagates the [`ValidationError`] of a rejected submission.
    pub fn handle_input(&mut self, line: &str) -> Result<(), ValidationError> {
        match line.trim().strip_prefix('/') {
            Some(command) => {
                self.handle_command(command.trim());
                Ok(())
            }
            None => self.submit(line),
        }
    }

    /// Handle a user command
    pub fn handle_command(&mut self, command: &str) {
        tracing::debug!(command, "Handling command");
        match command {
            "help" => {
                self.notify(NotifyLevel::Info, HELP_TEXT);
            }
            "clear" => match self.clear_history() {
                Ok(()) => self.notify(NotifyLevel::Info, "Conversation cleared"),
                Err(ValidationError::Busy(_)) => {
                    self.notify(NotifyLevel::Warning, "Wait for the current reply to finish");
                }
                Err(_) => {}
            },
            "quit" | "exit" => {
                self.shutdown();
            }
            _ => {
                self.notify(NotifyLevel::Warning, format!("Unknown command: /{command}"));
            }
        }
    }

    /// Post an informational notice to the surface
    pub fn notify(&self, level: NotifyLevel, message: impl Into<String>) {
        self.send(SessionUpdate::Notify {
            level,
            message: message.into(),
        });
    }

    /// Tear the session down.
    ///
    /// Cancels the outstanding gateway call and the reveal timer. Late results
    /// are ignored and every later submission is rejected.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        tracing::info!(turns = self.history.len(), "Shutting down chat session");

        self.closed = true;
        self.shutdown.cancel();
        self.pending = None;
        self.reveal.cancel();
        self.set_state(ChatState::Idle);
        self.send(SessionUpdate::Closed);
    }

    fn set_state(&mut self, state: ChatState) {
        self.state = state;
        self.send(SessionUpdate::State { state });
    }

    fn send(&self, update: SessionUpdate) {
        if let Err(e) = self.tx.send(update) {
            tracing::warn!("Failed to send update to surface: {}", e);
        }
    }
}

impl<G: CompletionGateway> Drop for ChatSession<G> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
