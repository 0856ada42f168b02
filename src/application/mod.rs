//! Application layer with load coordination services.

/// Application services.
pub mod services;

pub use services::{ImagePipeline, LoadCoordinator};
