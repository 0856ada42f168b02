//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Image handling (caching, fetching, decoding).
pub mod image;

pub use config::{AppConfig, CliArgs, LogLevel, StorageManager};
pub use self::image::{
    CacheStats, DiskCacheStore, HttpFetcher, HttpFetcherConfig, LayeredCacheStore,
    MemoryCacheStore, RasterDecoder,
};
