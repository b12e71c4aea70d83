//! Error types for image downloads
//!
//! Failures are split into transient ones, which the retrying engine backs
//! off and tries again, and permanent ones, which surface immediately.

use std::time::Duration;
use thiserror::Error;

use crate::cancel::Cancelled;

/// Error types for download operations
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The caller's cancel signal fired
    #[error("operation cancelled")]
    Cancelled,

    /// Request exceeded its timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Peer closed the connection before the response completed
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Connection was aborted or reset mid-transfer
    #[error("connection aborted: {0}")]
    ConnectionAborted(String),

    /// Server answered with a non-success status
    #[error("HTTP error {status}: {url}")]
    Http { url: String, status: u16 },

    /// Any other transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// The input record cannot be downloaded
    #[error("invalid image record: {0}")]
    InvalidRecord(String),

    /// Creating the directory or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Cancelled> for DownloadError {
    fn from(_: Cancelled) -> Self {
        DownloadError::Cancelled
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return DownloadError::Timeout(error.to_string());
        }
        if let Some(status) = error.status() {
            return DownloadError::Http {
                url: error.url().map(ToString::to_string).unwrap_or_default(),
                status: status.as_u16(),
            };
        }
        classify_transport_message(&error_chain(&error))
    }
}

/// Flatten an error and its sources into one lowercase string
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

/// Map a transport failure message onto the retryable variants where it fits
pub(crate) fn classify_transport_message(message: &str) -> DownloadError {
    let lower = message.to_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        DownloadError::Timeout(message.to_string())
    } else if lower.contains("connection closed") || lower.contains("incompletemessage") {
        DownloadError::ConnectionClosed(message.to_string())
    } else if lower.contains("connection reset")
        || lower.contains("connection aborted")
        || lower.contains("broken pipe")
    {
        DownloadError::ConnectionAborted(message.to_string())
    } else {
        DownloadError::Request(message.to_string())
    }
}

impl DownloadError {
    /// Check if the error is transient and should be retried
    ///
    /// Timeouts, closed or aborted connections and HTTP 5xx are retryable.
    /// Everything else, including 4xx and IO failures, is permanent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Timeout(_)
            | DownloadError::ConnectionClosed(_)
            | DownloadError::ConnectionAborted(_) => true,
            DownloadError::Http { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}

/// Exponential backoff for the retrying download engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::utils::DEFAULT_MAX_RETRIES,
            base_delay: crate::utils::DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (0-based): base, 2×base, 4×base, …
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
