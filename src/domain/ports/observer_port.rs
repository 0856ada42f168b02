//! Port definition for load result delivery.

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::entities::{LoadedImage, ResourceKey};
use crate::domain::errors::LoadError;

/// Receives the outcome of a load request.
///
/// Exactly one method fires per request that is not cancelled first, always on
/// the context that drives the coordinator.
pub trait LoadObserver: Send {
    /// Called with the decoded image.
    fn on_delivered(&mut self, image: LoadedImage);

    /// Called when the request failed.
    fn on_failed(&mut self, key: &ResourceKey, error: LoadError);
}

/// Message sent when a load request finishes.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The requested key.
    pub key: ResourceKey,
    /// The loaded image, or the failure.
    pub result: Result<LoadedImage, LoadError>,
}

impl LoadObserver for mpsc::UnboundedSender<ImageLoadedEvent> {
    fn on_delivered(&mut self, image: LoadedImage) {
        let event = ImageLoadedEvent {
            key: image.key.clone(),
            result: Ok(image),
        };
        if let Err(e) = self.send(event) {
            warn!(key = %e.0.key, "Image event receiver dropped");
        }
    }

    fn on_failed(&mut self, key: &ResourceKey, error: LoadError) {
        let event = ImageLoadedEvent {
            key: key.clone(),
            result: Err(error),
        };
        if let Err(e) = self.send(event) {
            warn!(key = %e.0.key, "Image event receiver dropped");
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    /// Observed callback.
    #[derive(Debug, Clone)]
    pub enum ObservedEvent {
        Delivered(LoadedImage),
        Failed(ResourceKey, LoadError),
    }

    /// Observer that records every callback. Clones share the record.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingObserver {
        events: Arc<Mutex<Vec<ObservedEvent>>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ObservedEvent> {
            self.events.lock().clone()
        }

        pub fn delivered(&self) -> Vec<LoadedImage> {
            self.events
                .lock()
                .iter()
                .filter_map(|event| match event {
                    ObservedEvent::Delivered(image) => Some(image.clone()),
                    ObservedEvent::Failed(..) => None,
                })
                .collect()
        }

        pub fn failures(&self) -> Vec<LoadError> {
            self.events
                .lock()
                .iter()
                .filter_map(|event| match event {
                    ObservedEvent::Failed(_, error) => Some(error.clone()),
                    ObservedEvent::Delivered(_) => None,
                })
                .collect()
        }

        pub fn is_empty(&self) -> bool {
            self.events.lock().is_empty()
        }
    }

    impl LoadObserver for RecordingObserver {
        fn on_delivered(&mut self, image: LoadedImage) {
            self.events.lock().push(ObservedEvent::Delivered(image));
        }

        fn on_failed(&mut self, key: &ResourceKey, error: LoadError) {
            self.events
                .lock()
                .push(ObservedEvent::Failed(key.clone(), error));
        }
    }
}
