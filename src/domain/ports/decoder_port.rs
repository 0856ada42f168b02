//! Port definition for image decoding.

use crate::domain::entities::DecodedImage;
use crate::domain::errors::DecodeError;

/// Turns raw bytes into a decoded image.
///
/// Decoding is pure and deterministic: the same bytes always produce the same
/// outcome.
#[cfg_attr(test, mockall::automock)]
pub trait ImageDecoder: Send + Sync {
    /// Decodes `bytes`.
    ///
    /// # Errors
    /// Returns `DecodeError` for empty, unrecognized or malformed payloads.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}
