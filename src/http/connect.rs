//! One-shot connection setup: DNS -> TCP -> TLS -> HTTP/1.1 handshake.
//!
//! Every upload opens its own connection and drops it when the call
//! returns; there is no pooling or reuse.

use crate::base::error::UploadError;
use boring::ssl::{SslConnector, SslMethod};
use bytes::Bytes;
use http::{Request, Response};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use url::Url;

/// A connected socket, plain or TLS.
#[derive(Debug)]
enum SocketType {
    Tcp(TcpStream),
    Ssl(tokio_boring::SslStream<TcpStream>),
}

impl AsyncRead for SocketType {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            SocketType::Ssl(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SocketType {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            SocketType::Ssl(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_flush(cx),
            SocketType::Ssl(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            SocketType::Ssl(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// An established HTTP/1.1 stream to the upload target.
pub(crate) struct HttpStream {
    sender: http1::SendRequest<http_body_util::Full<Bytes>>,
}

impl HttpStream {
    pub(crate) async fn send_request(
        &mut self,
        req: Request<http_body_util::Full<Bytes>>,
    ) -> Result<Response<Incoming>, UploadError> {
        self.sender
            .send_request(req)
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))
    }
}

/// Connect to the URL's host and complete the HTTP/1.1 handshake.
///
/// The whole sequence (DNS, TCP, TLS for https) is bounded by `timeout`.
pub(crate) async fn connect(url: &Url, timeout: Duration) -> Result<HttpStream, UploadError> {
    let socket = tokio::time::timeout(timeout, open_socket(url))
        .await
        .map_err(|_| UploadError::TimedOut(timeout.as_millis() as u64))??;

    let io = TokioIo::new(socket);
    let (sender, conn) = http1::handshake(io)
        .await
        .map_err(|e| UploadError::ConnectionFailed(e.to_string()))?;

    // Drive the connection until the exchange completes or the sender is
    // dropped; either way the socket is released with the task.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "connection terminated");
        }
    });

    Ok(HttpStream { sender })
}

async fn open_socket(url: &Url) -> Result<SocketType, UploadError> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UploadError::UnsupportedScheme(other.to_string())),
    }

    let host = url
        .host_str()
        .ok_or_else(|| UploadError::InvalidUrl(url.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| UploadError::InvalidUrl(url.to_string()))?;

    // 1. DNS Resolution
    let addr_str = format!("{}:{}", host, port);
    let addrs = tokio::net::lookup_host(&addr_str)
        .await
        .map_err(|_| UploadError::NameNotResolved(host.to_string()))?;

    // 2. TCP Connect, first address that accepts wins
    let mut last_err = None;
    let mut stream = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }

    let stream = stream.ok_or_else(|| {
        UploadError::ConnectionFailed(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("no addresses for {addr_str}")),
        )
    })?;

    // 3. TLS Handshake (if https)
    if url.scheme() == "https" {
        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|e| UploadError::TlsHandshake(e.to_string()))?;
        // This client only speaks HTTP/1.1
        builder
            .set_alpn_protos(b"\x08http/1.1")
            .map_err(|e| UploadError::TlsHandshake(e.to_string()))?;

        let config = builder
            .build()
            .configure()
            .map_err(|e| UploadError::TlsHandshake(e.to_string()))?;

        let tls_stream = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| UploadError::TlsHandshake(format!("{e:?}")))?;

        Ok(SocketType::Ssl(tls_stream))
    } else {
        Ok(SocketType::Tcp(stream))
    }
}
