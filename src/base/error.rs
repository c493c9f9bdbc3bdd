use thiserror::Error;

/// Error classes surfaced to callers.
///
/// Validation and encoding errors occur before any network I/O; transport
/// errors carry the underlying cause of a failed exchange. Non-2xx HTTP
/// responses are not errors and come back as a normal response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Encoding,
    Transport,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    // Validation
    #[error("url and formData are required")]
    MissingArguments,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    // Encoding
    #[error("invalid base64 data url format")]
    MalformedDataUrl,
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    // Transport
    #[error("name not resolved: {0}")]
    NameNotResolved(String),
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
    #[error("timed out after {0} ms")]
    TimedOut(u64),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("response read failed: {0}")]
    ResponseRead(String),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::MissingArguments
            | UploadError::InvalidUrl(_)
            | UploadError::UnsupportedScheme(_)
            | UploadError::InvalidHeader(_) => ErrorKind::Validation,

            UploadError::MalformedDataUrl | UploadError::Base64(_) => ErrorKind::Encoding,

            UploadError::NameNotResolved(_)
            | UploadError::ConnectionFailed(_)
            | UploadError::TlsHandshake(_)
            | UploadError::TimedOut(_)
            | UploadError::RequestFailed(_)
            | UploadError::ResponseRead(_) => ErrorKind::Transport,
        }
    }
}
