//! Retry policy for transient gateway failures.
//!
//! Disabled by default: with `max_retries == 0` every completion is a single
//! attempt.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::traits::GatewayError;

/// Bounded exponential backoff with jitter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay (before jitter)
    pub max_backoff_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f32,

    /// Add up to 25% random jitter to each delay
    pub use_jitter: bool,

    /// Status codes treated as transient
    pub retry_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 250,
            max_backoff_ms: 4_000,
            backoff_multiplier: 2.0,
            use_jitter: true,
            retry_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Calculate backoff duration for attempt N (0-indexed)
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base =
            self.initial_backoff_ms as f64 * f64::from(self.backoff_multiplier).powi(exponent);
        let capped = base.min(self.max_backoff_ms as f64);

        let duration_ms = if self.use_jitter {
            let jitter = rand::random::<f64>() * 0.25;
            (capped * (1.0 + jitter)) as u64
        } else {
            capped as u64
        };

        Duration::from_millis(duration_ms)
    }

    /// Whether `error` is worth another attempt
    #[must_use]
    pub fn should_retry(&self, error: &GatewayError) -> bool {
        match error {
            GatewayError::Remote { status, .. } => self.retry_status_codes.contains(status),
            GatewayError::Transport(_) | GatewayError::Timeout(_) => true,
            GatewayError::Decode(_) | GatewayError::Cancelled => false,
        }
    }
}
