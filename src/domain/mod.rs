//! Domain layer with core entities, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CachedEntry, DecodedImage, LoadedImage, ResourceKey};
pub use errors::{DecodeError, FetchError, LoadError};
pub use ports::{CacheStorePort, FetcherPort, ImageDecoder, LoadObserver};
