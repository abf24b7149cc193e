//! HTTP Gateway Implementation
//!
//! Talks to the chat proxy endpoint:
//!
//! - `POST <endpoint>` with `{"history": [...], "systemInstruction": "..."}`
//! - `2xx` → `{"reply": "..."}`
//! - otherwise → `{"error": "..."}`, surfaced verbatim

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::retry::RetryPolicy;
use super::traits::{CompletionGateway, GatewayError, GatewayRequest, ReplyBody};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion gateway backed by a single HTTP endpoint
#[derive(Clone)]
pub struct HttpGateway {
    /// Full URL of the chat endpoint
    endpoint: String,
    /// Per-request timeout
    timeout: Duration,
    /// Retry policy for transient failures
    retry: RetryPolicy,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpGateway {
    /// Create a gateway for `endpoint` with default timeout and no retries
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::none(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One request/response round trip
    async fn attempt(&self, request: &GatewayRequest) -> Result<String, GatewayError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_response(status.as_u16(), &body));
        }

        let body: ReplyBody = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout)
            } else {
                GatewayError::Decode(e.to_string())
            }
        })?;

        Ok(body.reply)
    }

    fn classify(&self, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Timeout(self.timeout)
        } else {
            GatewayError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn complete(
        &self,
        request: &GatewayRequest,
        cancel: &CancellationToken,
    ) -> Result<String, GatewayError> {
        let mut attempt = 0;

        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(GatewayError::Cancelled),
                result = self.attempt(request) => result,
            };

            match result {
                Ok(reply) => {
                    tracing::debug!(
                        endpoint = %self.endpoint,
                        attempt,
                        reply_chars = reply.chars().count(),
                        "Gateway reply received"
                    );
                    return Ok(reply);
                }
                Err(err) if attempt < self.retry.max_retries && self.retry.should_retry(&err) => {
                    // Exponential backoff before the next retry
                    let delay = self.retry.backoff_for_attempt(attempt);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient gateway failure, retrying"
                    );
                    attempt += 1;
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(GatewayError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                Err(err) => {
                    tracing::warn!(endpoint = %self.endpoint, error = %err, "Gateway call failed");
                    return Err(err);
                }
            }
        }
    }
}
