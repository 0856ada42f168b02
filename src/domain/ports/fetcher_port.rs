//! Port definition for network retrieval.

use async_trait::async_trait;

use crate::domain::entities::{FetchedResponse, ResourceKey};
use crate::domain::errors::FetchError;

/// Retrieves the bytes of a resource.
///
/// Dropping the returned future cancels the retrieval. Implementations do not
/// retry.
#[async_trait]
pub trait FetcherPort: Send + Sync {
    /// Fetches the payload and response metadata for `key`.
    async fn fetch(&self, key: &ResourceKey) -> Result<FetchedResponse, FetchError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Notify;

    use crate::domain::entities::ResponseMetadata;

    /// Mock fetcher that returns a canned result, optionally held back until
    /// released by the test.
    pub struct MockFetcher {
        result: Mutex<Result<FetchedResponse, FetchError>>,
        gate: Option<Notify>,
        calls: AtomicUsize,
        completed: AtomicUsize,
        requested: Mutex<Vec<ResourceKey>>,
    }

    impl MockFetcher {
        /// Creates a fetcher that immediately succeeds with `bytes`.
        pub fn succeeding(bytes: impl Into<bytes::Bytes>) -> Self {
            Self::with_result(Ok(FetchedResponse::new(
                bytes,
                ResponseMetadata::new(200).with_content_type("image/png"),
            )))
        }

        /// Creates a fetcher that immediately fails with `error`.
        pub fn failing(error: FetchError) -> Self {
            Self::with_result(Err(error))
        }

        fn with_result(result: Result<FetchedResponse, FetchError>) -> Self {
            Self {
                result: Mutex::new(result),
                gate: None,
                calls: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        /// Holds every fetch until [`MockFetcher::release`] is called.
        #[must_use]
        pub fn gated(mut self) -> Self {
            self.gate = Some(Notify::new());
            self
        }

        /// Lets one held fetch complete.
        pub fn release(&self) {
            if let Some(gate) = &self.gate {
                gate.notify_one();
            }
        }

        /// Replaces the result returned by subsequent fetches.
        pub fn set_bytes(&self, bytes: impl Into<bytes::Bytes>) {
            *self.result.lock() = Ok(FetchedResponse::new(bytes, ResponseMetadata::new(200)));
        }

        /// Number of fetches started.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Number of fetches that ran to completion.
        pub fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }

        /// Keys requested so far, in order.
        pub fn requested(&self) -> Vec<ResourceKey> {
            self.requested.lock().clone()
        }
    }

    #[async_trait]
    impl FetcherPort for MockFetcher {
        async fn fetch(&self, key: &ResourceKey) -> Result<FetchedResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(key.clone());

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            self.completed.fetch_add(1, Ordering::SeqCst);
            self.result.lock().clone()
        }
    }
}
