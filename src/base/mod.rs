//! Base types and error handling.
//!
//! Provides the crate-wide error type:
//! - [`UploadError`]: every failure an upload can surface
//! - [`ErrorKind`]: the validation / encoding / transport classification

pub mod error;

pub use error::{ErrorKind, UploadError};
