//! Domain error types.

mod decode_error;
mod fetch_error;
mod load_error;

pub use decode_error::DecodeError;
pub use fetch_error::FetchError;
pub use load_error::LoadError;
