//! Multipart form data encoding.
//!
//! Provides RFC 7578 multipart/form-data encoding for the upload body,
//! including inline base64 image fields carried as data URLs.
//!
//! # Example
//! ```ignore
//! use formnet::http::multipart::MultipartForm;
//!
//! let form = MultipartForm::new()
//!     .field("username", "user123")
//!     .field("avatar", "data:image/png;base64,iVBORw0KGgo...");
//!
//! let content_type = form.content_type();
//! let body = form.into_body()?;
//! ```

use crate::base::error::UploadError;
use crate::http::dataurl::DataUrl;
use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

/// A single form field value.
///
/// Classification happens on conversion: strings carrying an image data URL
/// become [`FieldValue::Image`], JSON objects and arrays keep their
/// structure for canonical serialization, and everything else is sent as
/// plain text. `Null` fields are skipped by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Json(Value),
    Image(String),
    Null,
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        if s.starts_with("data:image/") {
            FieldValue::Image(s.to_owned())
        } else {
            FieldValue::Text(s.to_owned())
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        if s.starts_with("data:image/") {
            FieldValue::Image(s)
        } else {
            FieldValue::Text(s)
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::from(s),
            Value::Object(_) | Value::Array(_) => FieldValue::Json(value),
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => FieldValue::Text(n.to_string()),
        }
    }
}

/// A multipart form with a per-instance random boundary.
///
/// Field insertion order is preserved on the wire; duplicate names emit
/// one part each.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<(String, FieldValue)>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    /// Create a new empty form with a freshly generated boundary.
    pub fn new() -> Self {
        Self {
            boundary: generate_boundary(),
            fields: Vec::new(),
        }
    }

    /// Get the boundary string.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Add a field.
    pub fn field<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode the form into the request body.
    ///
    /// Null fields produce no part. The output always terminates with the
    /// closing boundary line, even for an empty form. Fails on a malformed
    /// image data URL, before any byte is emitted for that field.
    pub fn into_body(self) -> Result<Bytes, UploadError> {
        let Self { boundary, fields } = self;
        let mut output = Vec::new();

        for (name, value) in fields {
            match value {
                FieldValue::Null => continue,
                FieldValue::Text(text) => {
                    write_text_field(&mut output, &boundary, &name, &text);
                }
                FieldValue::Json(json) => {
                    // serde_json's compact form is the canonical text
                    // representation of the structure.
                    write_text_field(&mut output, &boundary, &name, &json.to_string());
                }
                FieldValue::Image(data_url) => {
                    write_image_field(&mut output, &boundary, &name, &data_url)?;
                }
            }
        }

        output.extend_from_slice(b"--");
        output.extend_from_slice(boundary.as_bytes());
        output.extend_from_slice(b"--\r\n");

        Ok(Bytes::from(output))
    }
}

fn write_text_field(output: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    output.extend_from_slice(b"--");
    output.extend_from_slice(boundary.as_bytes());
    output.extend_from_slice(b"\r\n");
    output.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n",
            escape_quotes(name)
        )
        .as_bytes(),
    );
    output.extend_from_slice(b"\r\n");
    output.extend_from_slice(value.as_bytes());
    output.extend_from_slice(b"\r\n");
}

fn write_image_field(
    output: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    data_url: &str,
) -> Result<(), UploadError> {
    let parsed = DataUrl::parse(data_url)?;
    let filename = format!("{}.{}", name, parsed.extension());

    output.extend_from_slice(b"--");
    output.extend_from_slice(boundary.as_bytes());
    output.extend_from_slice(b"\r\n");
    output.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_quotes(name),
            escape_quotes(&filename)
        )
        .as_bytes(),
    );
    output.extend_from_slice(format!("Content-Type: {}\r\n", parsed.mime_type).as_bytes());
    output.extend_from_slice(b"\r\n");
    output.extend_from_slice(&parsed.data);
    output.extend_from_slice(b"\r\n");

    Ok(())
}

/// Escape quotes, backslashes, and line breaks in a header parameter.
fn escape_quotes(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains('"') || s.contains('\\') || s.contains('\r') || s.contains('\n') {
        std::borrow::Cow::Owned(
            s.replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

/// Generate a random boundary string, unique per upload.
///
/// A v4 UUID gives 122 random bits, enough to never collide with field
/// content in practice.
fn generate_boundary() -> String {
    format!("----formdata-{}", Uuid::new_v4())
}
