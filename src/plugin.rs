//! Host-runtime boundary.
//!
//! The thin surface a host dispatcher calls with already-unpacked,
//! possibly-absent arguments. Presence validation happens here, before any
//! encoding or network work; everything after is [`FormUpload`].

use crate::base::error::UploadError;
use crate::http::response::UploadResponse;
use crate::upload::FormUpload;
use serde_json::Value;
use tokio::task::JoinHandle;

/// Identity passthrough for diagnostics.
pub fn echo(value: String) -> String {
    tracing::info!(%value, "echo");
    value
}

/// Upload a multipart form.
///
/// `url` and `form_data` are required; `headers` and `timeout_ms` are
/// optional. Field values are classified from their JSON shape: data-URL
/// strings become image parts, objects and arrays are serialized to JSON
/// text, null fields are skipped.
pub async fn upload_form_data(
    url: Option<String>,
    headers: Option<Vec<(String, String)>>,
    form_data: Option<Vec<(String, Value)>>,
    timeout_ms: Option<i64>,
) -> Result<UploadResponse, UploadError> {
    let (url, form_data) = match (url, form_data) {
        (Some(url), Some(form_data)) if !url.is_empty() => (url, form_data),
        _ => return Err(UploadError::MissingArguments),
    };

    let mut upload = FormUpload::new(url);
    for (name, value) in headers.unwrap_or_default() {
        upload = upload.header(name, value);
    }
    for (name, value) in form_data {
        upload = upload.field(name, value);
    }
    if let Some(ms) = timeout_ms {
        upload = upload.timeout_ms(ms);
    }

    upload.send().await
}

/// Submit an upload as its own task.
///
/// The original host dispatched each call on a dedicated worker so the
/// caller's context never blocks; on this runtime that is task submission.
pub fn spawn_upload_form_data(
    url: Option<String>,
    headers: Option<Vec<(String, String)>>,
    form_data: Option<Vec<(String, Value)>>,
    timeout_ms: Option<i64>,
) -> JoinHandle<Result<UploadResponse, UploadError>> {
    tokio::spawn(upload_form_data(url, headers, form_data, timeout_ms))
}
