//! Normalized upload response.
//!
//! This is the user-facing response type: numeric status, status text,
//! flattened headers, and the body run through the JSON parse cascade.

use http::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Parsed response body.
///
/// The cascade tries a JSON object first, then a JSON array, and keeps
/// anything else (including scalar JSON like `42`) as raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Object(serde_json::Map<String, Value>),
    Array(Vec<Value>),
    Text(String),
}

impl ResponseData {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => ResponseData::Object(map),
            Ok(Value::Array(items)) => ResponseData::Array(items),
            _ => ResponseData::Text(body.to_owned()),
        }
    }
}

/// Normalized HTTP response handed back to the caller.
///
/// Serializes with camelCase keys (`statusText`) so host glue can forward
/// it across a JSON boundary unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub data: ResponseData,
}

impl UploadResponse {
    /// Build from the raw status, headers, and fully collected body bytes.
    pub fn from_parts(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let body_text = String::from_utf8_lossy(body);
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers: flatten_headers(headers),
            data: ResponseData::parse(&body_text),
        }
    }

    /// True for a 2xx status.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Flatten a header map into single string values.
///
/// Headers appearing multiple times under one name are joined with ", "
/// in their arrival order.
fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut out = HashMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ");
        out.insert(name.as_str().to_string(), joined);
    }
    out
}
