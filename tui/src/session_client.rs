//! Session Client
//!
//! Thin wrapper around [`ChatSession`] for TUI integration.
//! The session is embedded directly (no network between surface and core);
//! only the completion gateway talks HTTP.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All orchestration happens in the session. The TUI's job is:
//! 1. Forward input lines to the session
//! 2. Poll the session every frame
//! 3. Receive SessionUpdates
//! 4. Render display state based on them

use tokio::sync::mpsc;

use reelchat_core::{
    ChatConfig, ChatSession, ChatState, CompletionGateway, HttpGateway, ReelchatConfig,
    SessionUpdate, ValidationError,
};

/// Client for communicating with the embedded session
pub struct SessionClient<G: CompletionGateway + 'static = HttpGateway> {
    /// The embedded session
    session: ChatSession<G>,
    /// Receiver for updates from the session
    rx: mpsc::UnboundedReceiver<SessionUpdate>,
}

impl SessionClient<HttpGateway> {
    /// Create a client backed by the configured HTTP gateway
    pub fn new(config: &ReelchatConfig) -> Self {
        Self::with_gateway(config.http_gateway(), config.chat_config())
    }
}

impl<G: CompletionGateway + 'static> SessionClient<G> {
    /// Create a client over any gateway
    pub fn with_gateway(gateway: G, config: ChatConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = ChatSession::new(gateway, config, tx);
        Self { session, rx }
    }

    /// Send a line of input (a message or a `/command`)
    pub fn send_input(&mut self, line: &str) -> Result<(), ValidationError> {
        self.session.handle_input(line)
    }

    /// Make progress without blocking (must be called regularly)
    pub fn poll(&mut self) -> bool {
        self.session.poll()
    }

    /// Wait for the next piece of progress
    pub async fn wait(&mut self) -> bool {
        self.session.wait().await
    }

    /// Receive all pending updates from the session (non-blocking)
    pub fn recv_all(&mut self) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Get the current session state
    pub fn state(&self) -> ChatState {
        self.session.state()
    }

    /// Check if the session has shut down
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Tear the session down
    pub fn request_quit(&mut self) {
        self.session.shutdown();
    }
}
