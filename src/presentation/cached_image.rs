//! Headless image view: shows a placeholder until its image has loaded.

use crate::application::services::{ImagePipeline, LoadCoordinator};
use crate::domain::entities::{DecodedImage, ImageStatus, LoadedImage, ResourceKey};
use crate::domain::errors::LoadError;
use crate::domain::ports::LoadObserver;

/// What a view currently renders.
#[derive(Debug, Clone, Copy)]
pub enum Displayed<'a> {
    /// Nothing loaded yet, or the load failed.
    Placeholder,
    /// The loaded image.
    Image(&'a DecodedImage),
}

impl Displayed<'_> {
    /// Returns true if the placeholder is shown.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

/// Observer that keeps the latest loaded image for a view.
#[derive(Debug, Default)]
pub struct ImageSlot {
    image: Option<DecodedImage>,
    status: ImageStatus,
}

impl ImageSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last delivered image.
    #[must_use]
    pub const fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    /// Returns the load status.
    #[must_use]
    pub const fn status(&self) -> &ImageStatus {
        &self.status
    }

    /// Marks a load as started.
    pub fn set_loading(&mut self) {
        self.status = ImageStatus::Loading;
    }

    /// Drops back to the previous settled status after a cancelled load.
    pub fn reset_loading(&mut self) {
        if self.status.is_loading() {
            self.status = if self.image.is_some() {
                ImageStatus::Ready
            } else {
                ImageStatus::NotStarted
            };
        }
    }
}

impl LoadObserver for ImageSlot {
    fn on_delivered(&mut self, loaded: LoadedImage) {
        self.image = Some(loaded.image);
        self.status = ImageStatus::Ready;
    }

    fn on_failed(&mut self, _key: &ResourceKey, error: LoadError) {
        self.status = ImageStatus::Failed(error.to_string());
    }
}

/// A view bound to an optional image key.
///
/// Loading starts when the view appears and is cancelled when it disappears.
#[derive(Debug)]
pub struct CachedImageView {
    key: Option<ResourceKey>,
    coordinator: LoadCoordinator<ImageSlot>,
}

impl CachedImageView {
    /// Creates a view for `key` that loads through `pipeline`.
    #[must_use]
    pub fn new(pipeline: &ImagePipeline, key: Option<ResourceKey>) -> Self {
        Self {
            key,
            coordinator: pipeline.coordinator(ImageSlot::new()),
        }
    }

    /// Returns the key this view shows, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&ResourceKey> {
        self.key.as_ref()
    }

    /// Requests the view's image unless there is no key or it is already shown.
    pub async fn on_appear(&mut self) {
        let Some(key) = self.key.clone() else {
            return;
        };
        if self.coordinator.observer().image().is_some() {
            return;
        }

        self.coordinator.observer_mut().set_loading();
        self.coordinator.request(key).await;
    }

    /// Cancels any load still in flight.
    pub fn on_disappear(&mut self) {
        self.coordinator.cancel();
        self.coordinator.observer_mut().reset_loading();
    }

    /// Handles the in-flight load step once it completes. See
    /// [`LoadCoordinator::complete_pending`].
    pub async fn complete_pending(&mut self) -> bool {
        self.coordinator.complete_pending().await
    }

    /// Waits until no load is in flight.
    pub async fn settle(&mut self) {
        self.coordinator.settle().await;
    }

    /// Returns true while a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.coordinator.is_loading()
    }

    /// Returns the load status.
    #[must_use]
    pub const fn status(&self) -> &ImageStatus {
        self.coordinator.observer().status()
    }

    /// Returns what the view renders right now.
    #[must_use]
    pub const fn displayed(&self) -> Displayed<'_> {
        match self.coordinator.observer().image() {
            Some(image) => Displayed::Image(image),
            None => Displayed::Placeholder,
        }
    }
}
