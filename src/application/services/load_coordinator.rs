//! Cache-or-fetch coordination for a single image slot.
//!
//! A coordinator checks the shared cache store for a key, decodes on a hit and
//! otherwise fetches, stores and decodes, handing the result to its observer.
//! Every step that can suspend runs as a spawned task whose handle the
//! coordinator keeps. A result is only acted on when the owner drives
//! [`LoadCoordinator::complete_pending`], so every callback fires on the owner's
//! context and a `cancel` issued first always wins.

use std::sync::Arc;

use bytes::Bytes;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, trace, warn};

use crate::domain::entities::{
    CachedEntry, DecodedImage, FetchedResponse, ImageSource, LoadState, LoadedImage, ResourceKey,
};
use crate::domain::errors::{DecodeError, FetchError, LoadError};
use crate::domain::ports::{CacheStorePort, FetcherPort, ImageDecoder, LoadObserver};

/// Shared collaborators used by every coordinator.
#[derive(Clone)]
pub struct ImagePipeline {
    cache: Arc<dyn CacheStorePort>,
    fetcher: Arc<dyn FetcherPort>,
    decoder: Arc<dyn ImageDecoder>,
}

impl ImagePipeline {
    /// Creates a pipeline from its ports.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStorePort>,
        fetcher: Arc<dyn FetcherPort>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            decoder,
        }
    }

    /// Returns the shared cache store.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CacheStorePort> {
        &self.cache
    }

    /// Creates an idle coordinator delivering to `observer`.
    #[must_use]
    pub fn coordinator<O: LoadObserver>(&self, observer: O) -> LoadCoordinator<O> {
        LoadCoordinator::new(self.clone(), observer)
    }
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Decodes on the blocking pool so the owner's context is never held up.
async fn decode_payload(
    decoder: Arc<dyn ImageDecoder>,
    bytes: Bytes,
) -> Result<DecodedImage, DecodeError> {
    tokio::task::spawn_blocking(move || decoder.decode(&bytes))
        .await
        .map_err(|e| DecodeError::TaskFailed(e.to_string()))?
}

/// Looks `key` up off the owner's context and decodes a hit.
///
/// Resolves to `None` on a miss.
fn spawn_lookup(
    pipeline: &ImagePipeline,
    key: ResourceKey,
) -> JoinHandle<Option<Result<DecodedImage, DecodeError>>> {
    let cache = Arc::clone(&pipeline.cache);
    let decoder = Arc::clone(&pipeline.decoder);
    tokio::spawn(async move {
        let entry = match tokio::task::spawn_blocking(move || cache.lookup(&key)).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache lookup task failed");
                return None;
            }
        };
        Some(decode_payload(decoder, entry.bytes().clone()).await)
    })
}

/// Stores a fetched payload, then decodes it.
fn spawn_store_and_decode(
    pipeline: &ImagePipeline,
    key: ResourceKey,
    response: FetchedResponse,
) -> JoinHandle<Result<DecodedImage, DecodeError>> {
    let cache = Arc::clone(&pipeline.cache);
    let decoder = Arc::clone(&pipeline.decoder);
    tokio::spawn(async move {
        let bytes = response.bytes.clone();
        let size = bytes.len();
        let store_key = key.clone();
        match tokio::task::spawn_blocking(move || {
            cache.store(store_key, CachedEntry::from(response));
        })
        .await
        {
            Ok(()) => debug!(key = %key, size = size, "Stored fetched payload"),
            Err(e) => warn!(key = %key, error = %e, "Cache store task failed"),
        }
        decode_payload(decoder, bytes).await
    })
}

/// The step a request is suspended on.
enum Operation {
    Lookup(JoinHandle<Option<Result<DecodedImage, DecodeError>>>),
    Fetch(JoinHandle<Result<FetchedResponse, FetchError>>),
    Decode(JoinHandle<Result<DecodedImage, DecodeError>>),
}

impl Operation {
    fn abort(&self) {
        match self {
            Self::Lookup(handle) => handle.abort(),
            Self::Fetch(handle) => handle.abort(),
            Self::Decode(handle) => handle.abort(),
        }
    }
}

/// Result of a joined operation.
enum Joined {
    Lookup(Result<Option<Result<DecodedImage, DecodeError>>, JoinError>),
    Fetch(Result<Result<FetchedResponse, FetchError>, JoinError>),
    Decode(Result<Result<DecodedImage, DecodeError>, JoinError>),
}

/// State of the coordinator's current request.
struct LoadRequest {
    key: ResourceKey,
    operation: Option<Operation>,
    delivered: bool,
}

impl LoadRequest {
    const fn new(key: ResourceKey) -> Self {
        Self {
            key,
            operation: None,
            delivered: false,
        }
    }

    const fn is_in_flight(&self) -> bool {
        self.operation.is_some()
    }
}

/// Drives the load lifecycle of one image slot.
///
/// At most one operation is in flight per coordinator. Results reach the
/// observer at most once per request, and never after a `cancel`.
pub struct LoadCoordinator<O> {
    pipeline: ImagePipeline,
    observer: O,
    request: Option<LoadRequest>,
    state: LoadState,
}

impl<O: LoadObserver> LoadCoordinator<O> {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(pipeline: ImagePipeline, observer: O) -> Self {
        Self {
            pipeline,
            observer,
            request: None,
            state: LoadState::Idle,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// Returns true while a lookup, fetch or decode is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.request.as_ref().is_some_and(LoadRequest::is_in_flight)
    }

    /// Returns the key of the current or last completed request.
    #[must_use]
    pub fn active_key(&self) -> Option<&ResourceKey> {
        self.request.as_ref().map(|request| &request.key)
    }

    /// Returns the observer.
    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Returns the observer mutably.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Starts loading `key`, replacing any in-flight request.
    ///
    /// A fresh cache entry is decoded and delivered before this returns. On a
    /// miss, or when the cached payload does not decode, a fetch is started and
    /// its result is handled by [`Self::complete_pending`]. Dropping the returned
    /// future during the lookup leaves the lookup in flight.
    pub async fn request(&mut self, key: ResourceKey) {
        if self.is_loading() {
            debug!(key = %key, "Replacing in-flight image load");
            self.cancel();
        }

        let lookup = spawn_lookup(&self.pipeline, key.clone());
        let mut request = LoadRequest::new(key);
        request.operation = Some(Operation::Lookup(lookup));
        self.request = Some(request);
        self.transition(LoadState::Checking);

        self.complete_pending().await;
    }

    /// Waits for the in-flight operation and handles its result.
    ///
    /// A completed fetch is followed straight through its store and decode.
    /// Returns false immediately when nothing is in flight. Dropping the
    /// returned future at any point leaves the current operation recorded, so a
    /// later call resumes it and [`Self::cancel`] still stops it.
    pub async fn complete_pending(&mut self) -> bool {
        let mut progressed = false;

        while let Some(operation) = self.request.as_mut().and_then(|r| r.operation.as_mut()) {
            let joined = match operation {
                Operation::Lookup(handle) => Joined::Lookup(handle.await),
                Operation::Fetch(handle) => Joined::Fetch(handle.await),
                Operation::Decode(handle) => Joined::Decode(handle.await),
            };

            // No await between the join and the bookkeeping below.
            let Some(request) = self.request.as_mut() else {
                break;
            };
            request.operation = None;
            let key = request.key.clone();
            progressed = true;

            let follow_up = match joined {
                Joined::Lookup(joined) => {
                    self.finish_lookup(key, joined);
                    false
                }
                Joined::Fetch(joined) => self.finish_fetch(key, joined),
                Joined::Decode(joined) => {
                    self.finish_decode(&key, joined);
                    false
                }
            };
            if !follow_up {
                break;
            }
        }

        progressed
    }

    /// Drives the in-flight operation, if any, to completion.
    pub async fn settle(&mut self) {
        while self.complete_pending().await {}
    }

    /// Cancels the in-flight operation.
    ///
    /// No callback fires for the cancelled request, even if its operation
    /// already finished. A no-op when nothing is in flight.
    pub fn cancel(&mut self) {
        let Some(operation) = self.request.as_mut().and_then(|r| r.operation.take()) else {
            trace!("Cancel requested with nothing in flight");
            return;
        };

        operation.abort();
        if let Some(request) = self.request.take() {
            debug!(key = %request.key, "Cancelled image load");
        }
        self.transition(LoadState::Cancelled);
        self.transition(LoadState::Idle);
    }

    /// Handles a finished lookup. A fetch started here is left for the next
    /// `complete_pending` call.
    fn finish_lookup(
        &mut self,
        key: ResourceKey,
        joined: Result<Option<Result<DecodedImage, DecodeError>>, JoinError>,
    ) {
        match joined {
            Ok(Some(Ok(image))) => {
                trace!(key = %key, "Cache hit");
                self.deliver(&key, image, ImageSource::Cache);
            }
            Ok(Some(Err(e))) => {
                warn!(key = %key, error = %e, "Cached payload failed to decode, refetching");
                self.start_fetch(key);
            }
            Ok(None) => {
                trace!(key = %key, "Cache miss");
                self.start_fetch(key);
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, fetching");
                self.start_fetch(key);
            }
        }
    }

    fn start_fetch(&mut self, key: ResourceKey) {
        let fetcher = Arc::clone(&self.pipeline.fetcher);
        let fetch_key = key.clone();
        let handle = tokio::spawn(async move { fetcher.fetch(&fetch_key).await });

        if let Some(request) = self.request.as_mut() {
            request.operation = Some(Operation::Fetch(handle));
        }
        self.transition(LoadState::Fetching);
        debug!(key = %key, "Fetching image from network");
    }

    /// Handles a finished fetch, starting the store and decode on success.
    /// Returns true when that follow-up was started.
    fn finish_fetch(
        &mut self,
        key: ResourceKey,
        joined: Result<Result<FetchedResponse, FetchError>, JoinError>,
    ) -> bool {
        let outcome = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FetchError::Cancelled),
            Err(e) => Err(FetchError::network(format!("fetch task failed: {e}"))),
        };

        match outcome {
            Ok(response) => {
                let handle = spawn_store_and_decode(&self.pipeline, key, response);
                if let Some(request) = self.request.as_mut() {
                    request.operation = Some(Operation::Decode(handle));
                }
                self.transition(LoadState::Delivering);
                true
            }
            Err(e) if e.is_cancelled() => {
                debug!(key = %key, "Fetch reported cancellation, dropping result");
                self.transition(LoadState::Cancelled);
                self.transition(LoadState::Idle);
                false
            }
            Err(e) => {
                self.fail(&key, e.into());
                false
            }
        }
    }

    fn finish_decode(
        &mut self,
        key: &ResourceKey,
        joined: Result<Result<DecodedImage, DecodeError>, JoinError>,
    ) {
        match joined {
            Ok(Ok(image)) => self.deliver(key, image, ImageSource::Network),
            Ok(Err(e)) => self.fail(key, e.into()),
            Err(e) => self.fail(key, DecodeError::TaskFailed(e.to_string()).into()),
        }
    }

    fn deliver(&mut self, key: &ResourceKey, image: DecodedImage, source: ImageSource) {
        if !self.claim_delivery(key) {
            return;
        }

        self.transition(LoadState::Delivering);
        debug!(key = %key, source = %source, "Image loaded successfully");
        self.observer.on_delivered(LoadedImage {
            key: key.clone(),
            image,
            source,
        });
        self.transition(LoadState::Idle);
    }

    fn fail(&mut self, key: &ResourceKey, error: LoadError) {
        if !self.claim_delivery(key) {
            return;
        }

        warn!(key = %key, error = %error, "Image load failed");
        self.transition(LoadState::Failed);
        self.observer.on_failed(key, error);
        self.transition(LoadState::Idle);
    }

    /// Marks the current request as answered. False if it already was, or if
    /// `key` is no longer the active request.
    fn claim_delivery(&mut self, key: &ResourceKey) -> bool {
        match self.request.as_mut() {
            Some(request) if request.key == *key && !request.delivered => {
                request.delivered = true;
                true
            }
            _ => {
                trace!(key = %key, "Dropping result for a stale request");
                false
            }
        }
    }

    fn transition(&mut self, next: LoadState) {
        trace!(from = %self.state, to = %next, "Load state transition");
        self.state = next;
    }
}

impl<O> Drop for LoadCoordinator<O> {
    fn drop(&mut self) {
        if let Some(operation) = self.request.take().and_then(|r| r.operation) {
            operation.abort();
        }
    }
}

impl<O> std::fmt::Debug for LoadCoordinator<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("state", &self.state)
            .field("key", &self.request.as_ref().map(|r| &r.key))
            .field(
                "in_flight",
                &self.request.as_ref().is_some_and(LoadRequest::is_in_flight),
            )
            .finish_non_exhaustive()
    }
}
