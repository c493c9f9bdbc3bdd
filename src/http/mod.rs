pub mod dataurl;
pub mod multipart;
pub mod response;

pub(crate) mod connect;

// Re-exports for convenience
pub use dataurl::DataUrl;
pub use multipart::{FieldValue, MultipartForm};
pub use response::{ResponseData, UploadResponse};
