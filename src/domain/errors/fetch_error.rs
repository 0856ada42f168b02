//! Fetch error types.

use thiserror::Error;

/// Failures surfaced by a fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    #[error("request timed out")]
    Timeout,

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates status error.
    #[must_use]
    pub fn status(code: u16, reason: impl Into<String>) -> Self {
        Self::Status {
            code,
            reason: reason.into(),
        }
    }

    /// Returns whether the caller interrupted the fetch.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
