//! Image handling infrastructure.
//!
//! This module provides:
//! - Memory caching with LRU eviction
//! - Disk caching for persistence
//! - A layered store combining both
//! - HTTP fetching and raster decoding

pub mod decoder;
pub mod disk_cache;
pub mod http_fetcher;
pub mod layered_cache;
pub mod memory_cache;

pub use decoder::RasterDecoder;
pub use disk_cache::{DiskCacheError, DiskCacheStore, default_cache_dir};
pub use http_fetcher::{HttpFetcher, HttpFetcherConfig};
pub use layered_cache::LayeredCacheStore;
pub use memory_cache::{CacheStats, MemoryCacheStore};
