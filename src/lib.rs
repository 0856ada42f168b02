//! async-cached-image - Asynchronous image loading through a shared cache.
//!
//! This crate loads remote images for display slots, serving them from a
//! process-wide cache when possible and fetching, storing and decoding them
//! otherwise, with cancellation tied to the slot's visibility.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing load coordination.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing cache, network and decoder adapters.
pub mod infrastructure;
/// Presentation layer containing view glue.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "async-cached-image";

/// Qualifier used for platform directories.
pub const APP_QUALIFIER: &str = "com";

/// Organization used for platform directories.
pub const APP_ORGANIZATION: &str = "async-cached-image";
