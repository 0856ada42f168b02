//! Raster image decoder backed by the `image` crate.

use image::ImageError;
use image::imageops::FilterType;
use tracing::trace;

use crate::domain::entities::DecodedImage;
use crate::domain::errors::DecodeError;
use crate::domain::ports::ImageDecoder;

/// Decodes PNG, JPEG and WebP payloads, optionally bounding their size.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder {
    max_size: Option<(u32, u32)>,
}

impl RasterDecoder {
    /// Creates a decoder that keeps images at their original size.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_size: None }
    }

    /// Downsizes decoded images to fit within `width` x `height`, keeping aspect ratio.
    #[must_use]
    pub const fn with_max_size(mut self, width: u32, height: u32) -> Self {
        self.max_size = Some((width, height));
        self
    }
}

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }

        let img = image::load_from_memory(bytes).map_err(map_image_error)?;

        let img = match self.max_size {
            Some((width, height)) if img.width() > width || img.height() > height => {
                trace!(
                    from_width = img.width(),
                    from_height = img.height(),
                    "Downsizing decoded image"
                );
                img.resize(width, height, FilterType::Lanczos3)
            }
            _ => img,
        };

        Ok(DecodedImage::new(img))
    }
}

fn map_image_error(e: ImageError) -> DecodeError {
    match e {
        ImageError::Unsupported(e) => DecodeError::Unsupported(e.to_string()),
        other => DecodeError::Malformed(other.to_string()),
    }
}
