mod load_coordinator;

pub use load_coordinator::{ImagePipeline, LoadCoordinator};
