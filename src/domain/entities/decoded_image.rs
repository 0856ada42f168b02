//! Domain types for decoded images and the loading lifecycle.

use std::sync::Arc;

use super::ResourceKey;

/// In-memory decoded image, cheap to clone.
#[derive(Debug, Clone)]
pub struct DecodedImage(Arc<image::DynamicImage>);

impl DecodedImage {
    /// Wraps a decoded image.
    #[must_use]
    pub fn new(image: image::DynamicImage) -> Self {
        Self(Arc::new(image))
    }

    /// Returns the image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Returns the image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Returns the underlying image.
    #[must_use]
    pub fn as_dynamic(&self) -> &image::DynamicImage {
        &self.0
    }

    /// Returns a shared handle to the underlying image.
    #[must_use]
    pub fn shared(&self) -> Arc<image::DynamicImage> {
        Arc::clone(&self.0)
    }
}

impl From<image::DynamicImage> for DecodedImage {
    fn from(image: image::DynamicImage) -> Self {
        Self::new(image)
    }
}

/// Where a delivered image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Served from the cache store.
    Cache,
    /// Downloaded from the network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image handed to an observer.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// The key the image was requested for.
    pub key: ResourceKey,
    /// The decoded image.
    pub image: DecodedImage,
    /// Where it was loaded from.
    pub source: ImageSource,
}

/// Phase of a coordinator's request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No request in progress.
    #[default]
    Idle,
    /// Looking up the cache store and decoding a hit.
    Checking,
    /// Waiting for the network.
    Fetching,
    /// Storing and decoding a fetched payload, then handing it to the observer.
    Delivering,
    /// The in-flight work was cancelled. Passes straight through to `Idle`.
    Cancelled,
    /// The request failed and its observer was told. Passes straight through to `Idle`.
    Failed,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Fetching => "fetching",
            Self::Delivering => "delivering",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Status of an image slot as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    /// Loading has not started.
    #[default]
    NotStarted,
    /// A load is in progress; the placeholder is shown.
    Loading,
    /// The image is ready for display.
    Ready,
    /// Loading failed with an error message; the placeholder stays.
    Failed(String),
}

impl ImageStatus {
    /// Returns true if the image is ready for rendering.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns true if the image is currently being loaded.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true if loading failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_image_dimensions() {
        let image = DecodedImage::new(image::DynamicImage::new_rgb8(12, 7));
        assert_eq!(image.width(), 12);
        assert_eq!(image.height(), 7);
    }

    #[test]
    fn test_decoded_image_clone_shares_pixels() {
        let image = DecodedImage::new(image::DynamicImage::new_rgb8(1, 1));
        let copy = image.clone();
        assert!(Arc::ptr_eq(&image.shared(), &copy.shared()));
    }

    #[test]
    fn test_load_state_display() {
        assert_eq!(LoadState::default().to_string(), "idle");
        assert_eq!(LoadState::Delivering.to_string(), "delivering");
    }
}
