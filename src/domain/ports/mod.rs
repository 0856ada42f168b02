mod cache_store_port;
mod decoder_port;
mod fetcher_port;
mod observer_port;

pub use cache_store_port::CacheStorePort;
pub use decoder_port::ImageDecoder;
pub use fetcher_port::FetcherPort;
pub use observer_port::{ImageLoadedEvent, LoadObserver};

#[cfg(test)]
pub mod mocks {
    pub use super::cache_store_port::MockCacheStorePort;
    pub use super::decoder_port::MockImageDecoder;
    pub use super::fetcher_port::mock::MockFetcher;
    pub use super::observer_port::mock::{ObservedEvent, RecordingObserver};
}
