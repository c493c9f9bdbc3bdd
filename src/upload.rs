//! Form upload with builder pattern.
//!
//! Encodes the form, opens a single connection, POSTs the body, and
//! normalizes the response. One boundary and one connection per call.
//!
//! # Example
//!
//! ```rust,ignore
//! use formnet::FormUpload;
//!
//! let resp = FormUpload::new("https://api.example.com/upload")
//!     .header("Authorization", "Bearer token")
//!     .field("name", "alice")
//!     .field("avatar", "data:image/jpeg;base64,/9j/4AAQ...")
//!     .timeout_ms(5000)
//!     .send()
//!     .await?;
//! println!("Status: {}", resp.status);
//! ```

use crate::base::error::UploadError;
use crate::http::connect::connect;
use crate::http::multipart::{FieldValue, MultipartForm};
use crate::http::response::UploadResponse;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::{Method, Request};
use http_body_util::{BodyExt, Full};
use std::str::FromStr;
use std::time::Duration;
use url::{Position, Url};

/// Timeout applied when the caller supplies none (or a non-positive value).
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Builder for a single multipart upload.
pub struct FormUpload {
    url: String,
    headers: Vec<(String, String)>,
    form: MultipartForm,
    timeout: Duration,
}

impl FormUpload {
    /// Start an upload to the given URL.
    pub fn new<U: Into<String>>(url: U) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            form: MultipartForm::new(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Add a request header. Repeating a name keeps the last value.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a form field.
    pub fn field<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<FieldValue>,
    {
        self.form = self.form.field(name, value);
        self
    }

    /// Set the connect/read timeout in milliseconds.
    ///
    /// Non-positive values fall back to [`DEFAULT_TIMEOUT_MS`].
    pub fn timeout_ms(mut self, ms: i64) -> Self {
        self.timeout = if ms > 0 {
            Duration::from_millis(ms as u64)
        } else {
            Duration::from_millis(DEFAULT_TIMEOUT_MS)
        };
        self
    }

    /// Send the upload and await the normalized response.
    ///
    /// Encoding happens before the connection is opened, so an encoding
    /// failure performs no network I/O. Non-2xx statuses are returned as a
    /// normal response, not an error.
    pub async fn send(self) -> Result<UploadResponse, UploadError> {
        let url = Url::parse(&self.url).map_err(|e| UploadError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url = %url, "starting form upload");

        let content_type = self.form.content_type();
        let body = self.form.into_body()?;
        let content_length = body.len();

        let headers = build_headers(&url, &self.headers, &content_type, content_length)?;

        let mut stream = connect(&url, self.timeout).await?;

        let target = &url[Position::BeforePath..Position::AfterQuery];
        let mut request = Request::builder()
            .method(Method::POST)
            .uri(target)
            .body(Full::new(body))
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;
        *request.headers_mut() = headers;

        let timeout_ms = self.timeout.as_millis() as u64;
        let response = tokio::time::timeout(self.timeout, stream.send_request(request))
            .await
            .map_err(|_| UploadError::TimedOut(timeout_ms))??;

        let (parts, incoming) = response.into_parts();
        let body_bytes = tokio::time::timeout(self.timeout, incoming.collect())
            .await
            .map_err(|_| UploadError::TimedOut(timeout_ms))?
            .map_err(|e| UploadError::ResponseRead(e.to_string()))?
            .to_bytes();

        let response = UploadResponse::from_parts(parts.status, &parts.headers, &body_bytes);
        tracing::debug!(status = response.status, "form upload complete");
        Ok(response)
    }
}

/// Assemble the request headers.
///
/// Caller headers are applied in caller order on a replace-on-insert map;
/// the multipart Content-Type and exact Content-Length are inserted last
/// and always win over caller-supplied values for those names.
fn build_headers(
    url: &Url,
    caller: &[(String, String)],
    content_type: &str,
    content_length: usize,
) -> Result<HeaderMap, UploadError> {
    let mut headers = HeaderMap::new();

    let host = url
        .host_str()
        .ok_or_else(|| UploadError::InvalidUrl(url.to_string()))?;
    let host_value = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    headers.insert(
        HOST,
        HeaderValue::from_str(&host_value)
            .map_err(|_| UploadError::InvalidUrl(url.to_string()))?,
    );

    for (name, value) in caller {
        let header_name = HeaderName::from_str(name)
            .map_err(|_| UploadError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| UploadError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }

    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .map_err(|_| UploadError::InvalidHeader(CONTENT_TYPE.to_string()))?,
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));

    Ok(headers)
}
