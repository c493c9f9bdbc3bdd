//! Inline data URL parsing for image form fields.
//!
//! Handles the `data:{mime}[;params],{base64}` shape produced by canvas
//! exports and file pickers, e.g.
//! `data:image/jpeg;base64,/9j/4AAQSkZJRg...`.

use crate::base::error::UploadError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A decoded `data:` URL: MIME type plus raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    /// Parse a base64 data URL.
    ///
    /// Exactly one comma must separate the header segment from the payload;
    /// anything else is a format error. The payload is decoded with the
    /// standard padded base64 alphabet.
    pub fn parse(input: &str) -> Result<Self, UploadError> {
        let (header, payload) = input.split_once(',').ok_or(UploadError::MalformedDataUrl)?;
        if payload.is_empty() || payload.contains(',') {
            return Err(UploadError::MalformedDataUrl);
        }

        let meta = header
            .strip_prefix("data:")
            .ok_or(UploadError::MalformedDataUrl)?;
        // MIME type runs up to the first ';' (parameters such as ;base64
        // or ;charset are not interpreted).
        let mime_type = meta.split(';').next().unwrap_or(meta);

        let data = STANDARD.decode(payload)?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Filename extension for the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}
