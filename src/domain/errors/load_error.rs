//! Load error types.

use thiserror::Error;

use super::{DecodeError, FetchError};

/// Failure reported to an observer for a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

impl LoadError {
    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Fetch(FetchError::Network(_) | FetchError::Timeout | FetchError::Status { .. })
        )
    }
}
