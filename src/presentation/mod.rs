//! Presentation layer with view glue for cached images.

/// Cached image view.
pub mod cached_image;

pub use cached_image::{CachedImageView, Displayed, ImageSlot};
