//! Reveal Scheduler
//!
//! Paces an already-complete reply onto the screen one character at a time.
//! Nothing arrives incrementally; this exists purely for presentation.
//!
//! # Design
//!
//! Each reveal runs as its own tokio task driven by `tokio::time::interval`.
//! The task owns the [`RevealState`] and reports progress over a channel:
//!
//! ```text
//! start("abc") ──► Step{"a"} ─► Step{"ab"} ─► Step{"abc"} ─► Finished{"abc"}
//!                 (+interval)   (+interval)    (+interval)
//! ```
//!
//! The scheduler holds at most one active reveal. Starting another one, calling
//! [`RevealScheduler::cancel`], cancelling the parent token, or dropping the
//! scheduler stops the pending timer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default delay between revealed characters
pub const DEFAULT_REVEAL_INTERVAL: Duration = Duration::from_millis(20);

/// Capacity of the progress channel
const EVENT_BUFFER: usize = 64;

/// Progress of an in-flight reveal.
///
/// Lengths are counted in `char`s so multi-byte text is never split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealState {
    full_text: String,
    revealed_bytes: usize,
}

impl RevealState {
    /// Start a reveal at the empty prefix
    pub fn new(full_text: impl Into<String>) -> Self {
        Self {
            full_text: full_text.into(),
            revealed_bytes: 0,
        }
    }

    /// The text being revealed
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Currently visible prefix
    #[must_use]
    pub fn visible(&self) -> &str {
        &self.full_text[..self.revealed_bytes]
    }

    /// Whether the visible prefix equals the full text
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.revealed_bytes == self.full_text.len()
    }

    /// Reveal one more character. Returns `false` once complete.
    pub fn advance(&mut self) -> bool {
        match self.full_text[self.revealed_bytes..].chars().next() {
            Some(ch) => {
                self.revealed_bytes += ch.len_utf8();
                true
            }
            None => false,
        }
    }

    /// Consume the state, returning the full text
    #[must_use]
    pub fn into_full_text(self) -> String {
        self.full_text
    }
}

/// Progress reported by a running reveal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    /// One more character became visible
    Step {
        /// The visible prefix after this step
        visible: String,
    },
    /// The whole text is visible; commit it
    Finished {
        /// The full text, identical to what was started
        text: String,
    },
}

/// Handle on the running reveal task
struct ActiveReveal {
    rx: mpsc::Receiver<RevealEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ActiveReveal {
    fn stop(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// Schedules character-by-character reveals, one at a time
pub struct RevealScheduler {
    interval: Duration,
    parent: CancellationToken,
    active: Option<ActiveReveal>,
}

impl RevealScheduler {
    /// Create a scheduler revealing one character per `interval`.
    ///
    /// Cancelling `parent` stops any reveal this scheduler starts.
    #[must_use]
    pub fn new(interval: Duration, parent: CancellationToken) -> Self {
        Self {
            interval,
            parent,
            active: None,
        }
    }

    /// Whether a reveal is in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begin revealing `text`, superseding any reveal already running
    pub fn start(&mut self, text: impl Into<String>) {
        self.cancel();

        let state = RevealState::new(text);
        let cancel = self.parent.child_token();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tracing::debug!(
            chars = state.full_text().chars().count(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting reveal"
        );

        let task = tokio::spawn(run_reveal(state, self.interval, tx, cancel.clone()));
        self.active = Some(ActiveReveal { rx, cancel, task });
    }

    /// Stop the current reveal, if any. Its remaining events are discarded.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Cancelling reveal");
            active.stop();
        }
    }

    /// Wait for the next event of the current reveal.
    ///
    /// Returns `None` when no reveal is active or it was cancelled.
    pub async fn next_event(&mut self) -> Option<RevealEvent> {
        let active = self.active.as_mut()?;
        let event = active.rx.recv().await;
        self.settle(event)
    }

    /// Take the next event if one is ready, without waiting
    pub fn try_next_event(&mut self) -> Option<RevealEvent> {
        let active = self.active.as_mut()?;
        match active.rx.try_recv() {
            Ok(event) => self.settle(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => self.settle(None),
        }
    }

    /// Drop the active reveal once it finishes or its task goes away
    fn settle(&mut self, event: Option<RevealEvent>) -> Option<RevealEvent> {
        if !matches!(event, Some(RevealEvent::Step { .. })) {
            self.active = None;
        }
        event
    }
}

impl Drop for RevealScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timer loop for a single reveal
async fn run_reveal(
    mut state: RevealState,
    period: Duration,
    tx: mpsc::Sender<RevealEvent>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    while !state.is_complete() {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }

        state.advance();
        let step = RevealEvent::Step {
            visible: state.visible().to_string(),
        };
        if !deliver(&tx, &cancel, step).await {
            return;
        }
    }

    let finished = RevealEvent::Finished {
        text: state.into_full_text(),
    };
    deliver(&tx, &cancel, finished).await;
}

/// Send an event unless cancelled or the receiver is gone
async fn deliver(
    tx: &mpsc::Sender<RevealEvent>,
    cancel: &CancellationToken,
    event: RevealEvent,
) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        sent = tx.send(event) => sent.is_ok(),
    }
}
