//! # formnet
//!
//! A multipart/form-data encoder and HTTP uploader.
//!
//! `formnet` serializes a flat key-value form payload (plain text, nested
//! JSON values, inline base64 image data URLs) per RFC 7578 multipart
//! conventions and POSTs it over a single dedicated connection, returning a
//! normalized response.
//!
//! ## Features
//!
//! - **Multipart Encoding**: per-request random boundary, CRLF framing,
//!   image fields with detected MIME type and synthesized filename
//! - **Single-shot Upload**: one connection per call, exact Content-Length,
//!   connect and read timeouts
//! - **HTTPS**: BoringSSL with default verification, no configuration knobs
//! - **Response Normalization**: multi-value headers joined in order, body
//!   parsed as JSON object, JSON array, or raw text
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formnet::FormUpload;
//!
//! #[tokio::main]
//! async fn main() {
//!     let response = FormUpload::new("https://api.example.com/upload")
//!         .header("Authorization", "Bearer token")
//!         .field("name", "alice")
//!         .field("avatar", "data:image/png;base64,iVBORw0KGgo...")
//!         .send()
//!         .await
//!         .unwrap();
//!     println!("Status: {}", response.status);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types and classification
//! - [`http`] - Multipart encoding, data URLs, response normalization
//! - [`upload`] - The uploader and its builder
//! - [`plugin`] - Host-runtime boundary (argument validation, task submission)

pub mod base;
pub mod http;
pub mod plugin;
pub mod upload;

pub use base::{ErrorKind, UploadError};
pub use http::{FieldValue, MultipartForm, ResponseData, UploadResponse};
pub use upload::{FormUpload, DEFAULT_TIMEOUT_MS};
