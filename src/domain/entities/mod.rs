//! Domain entity definitions.

mod cached_entry;
mod decoded_image;
mod resource;

pub use cached_entry::{CachedEntry, FetchedResponse, ResponseMetadata};
pub use decoded_image::{DecodedImage, ImageSource, ImageStatus, LoadState, LoadedImage};
pub use resource::ResourceKey;
