//! Decode error types.

use thiserror::Error;

/// Failures turning a payload into an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("unsupported image format: {0}")]
    Unsupported(String),

    #[error("malformed image data: {0}")]
    Malformed(String),

    #[error("decode task failed: {0}")]
    TaskFailed(String),
}
