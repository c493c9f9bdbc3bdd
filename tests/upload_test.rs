//! End-to-end upload tests against a local mock server.
//!
//! Each test binds a loopback listener, serves exactly one canned HTTP/1.1
//! response, and hands the captured request bytes back for inspection.

use formnet::{plugin, ErrorKind, FormUpload, ResponseData, UploadError};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one full request: headers, then Content-Length body bytes.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let total = pos + 4 + content_length;
            while buf.len() < total {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return buf;
        }
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return buf;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Serve one connection with a canned response; returns the upload URL and
/// a handle resolving to the captured request bytes.
async fn serve_once(response: &str) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = response.to_string();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });
    (format!("http://{addr}/upload"), handle)
}

// === Success Path ===

#[tokio::test]
async fn test_upload_returns_normalized_response() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 11\r\n\
         \r\n\
         {\"ok\":true}",
    )
    .await;

    let response = FormUpload::new(&url)
        .field("name", "alice")
        .field("avatar", "data:image/jpeg;base64,AAAA")
        .timeout_ms(5000)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.headers["content-type"], "application/json");
    match &response.data {
        ResponseData::Object(map) => assert_eq!(map["ok"], true),
        other => panic!("expected object body, got {other:?}"),
    }

    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request);
    assert!(text.starts_with("POST /upload HTTP/1.1\r\n"));
    assert!(text.contains("content-type: multipart/form-data; boundary=----formdata-"));
    assert!(text.contains("Content-Disposition: form-data; name=\"name\"\r\n\r\nalice\r\n"));
    assert!(text.contains(
        "Content-Disposition: form-data; name=\"avatar\"; filename=\"avatar.jpg\"\r\n\
         Content-Type: image/jpeg\r\n"
    ));
}

#[tokio::test]
async fn test_declared_content_length_matches_body() {
    let (url, server) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;

    FormUpload::new(&url)
        .field("a", "first")
        .field("b", "data:image/png;base64,AAAA")
        .send()
        .await
        .unwrap();

    let request = server.await.unwrap();
    let head_end = find_subslice(&request, b"\r\n\r\n").unwrap();
    let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
    let declared = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap();
    assert_eq!(declared, request.len() - head_end - 4);
}

#[tokio::test]
async fn test_caller_headers_forwarded_multipart_content_type_wins() {
    let (url, server) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;

    FormUpload::new(&url)
        .header("Content-Type", "text/plain")
        .header("Authorization", "Bearer token-123")
        .field("k", "v")
        .send()
        .await
        .unwrap();

    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request).to_lowercase();
    assert!(text.contains("authorization: bearer token-123"));
    assert!(text.contains("content-type: multipart/form-data; boundary="));
    assert!(!text.contains("content-type: text/plain"));
}

// === Response Body Cascade ===

#[tokio::test]
async fn test_array_body_parses_as_array() {
    let (url, _server) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 7\r\n\r\n[1,2,3]").await;

    let response = FormUpload::new(&url).field("k", "v").send().await.unwrap();
    assert_eq!(
        response.data,
        ResponseData::Array(vec![1.into(), 2.into(), 3.into()])
    );
}

#[tokio::test]
async fn test_non_json_body_stays_raw_text() {
    let (url, _server) = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 8\r\n\r\nnot json").await;

    let response = FormUpload::new(&url).field("k", "v").send().await.unwrap();
    assert_eq!(response.data, ResponseData::Text("not json".into()));
}

#[tokio::test]
async fn test_empty_body_yields_empty_text() {
    let (url, _server) = serve_once("HTTP/1.1 204 No Content\r\n\r\n").await;

    let response = FormUpload::new(&url).field("k", "v").send().await.unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(response.data, ResponseData::Text(String::new()));
}

// === Response Headers ===

#[tokio::test]
async fn test_repeated_response_headers_joined_in_order() {
    let (url, _server) = serve_once(
        "HTTP/1.1 200 OK\r\n\
         Set-Cookie: a=1\r\n\
         Set-Cookie: b=2\r\n\
         Content-Length: 0\r\n\
         \r\n",
    )
    .await;

    let response = FormUpload::new(&url).field("k", "v").send().await.unwrap();
    assert_eq!(response.headers["set-cookie"], "a=1, b=2");
}

// === Non-2xx Statuses ===

#[tokio::test]
async fn test_error_status_is_returned_not_raised() {
    let (url, _server) = serve_once(
        "HTTP/1.1 422 Unprocessable Entity\r\n\
         Content-Type: application/json\r\n\
         Content-Length: 23\r\n\
         \r\n\
         {\"error\":\"bad request\"}",
    )
    .await;

    let response = FormUpload::new(&url).field("k", "v").send().await.unwrap();
    assert_eq!(response.status, 422);
    assert_eq!(response.status_text, "Unprocessable Entity");
    assert!(!response.ok());
    match &response.data {
        ResponseData::Object(map) => assert_eq!(map["error"], "bad request"),
        other => panic!("expected object body, got {other:?}"),
    }
}

// === Failure Paths ===

#[tokio::test]
async fn test_read_timeout_surfaces_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut socket).await;
        // Never respond.
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
    });

    let err = FormUpload::new(format!("http://{addr}/upload"))
        .field("k", "v")
        .timeout_ms(200)
        .send()
        .await
        .unwrap_err();

    assert_eq!(err, UploadError::TimedOut(200));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_connection_refused_surfaces_transport_error() {
    // Bind then drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = FormUpload::new(format!("http://{addr}/upload"))
        .field("k", "v")
        .timeout_ms(2000)
        .send()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_encoding_error_performs_no_network_call() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let err = FormUpload::new(format!("http://{addr}/upload"))
        .field("img", "data:image/png;base64,AAAA,BBBB")
        .send()
        .await
        .unwrap_err();

    assert_eq!(err, UploadError::MalformedDataUrl);
    assert_eq!(err.kind(), ErrorKind::Encoding);

    // No connection must have been attempted.
    let accepted = tokio::time::timeout(
        std::time::Duration::from_millis(100),
        listener.accept(),
    )
    .await;
    assert!(accepted.is_err());
}

#[tokio::test]
async fn test_invalid_url_rejected_before_io() {
    let err = FormUpload::new("not a url")
        .field("k", "v")
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_unsupported_scheme_rejected() {
    let err = FormUpload::new("ftp://example.test/upload")
        .field("k", "v")
        .send()
        .await
        .unwrap_err();
    assert_eq!(err, UploadError::UnsupportedScheme("ftp".into()));
}

// === Plugin Boundary ===

#[tokio::test]
async fn test_plugin_upload_classifies_json_fields() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 11\r\n\r\n{\"ok\":true}",
    )
    .await;

    let response = plugin::upload_form_data(
        Some(url),
        Some(vec![("X-Request-Id".into(), "42".into())]),
        Some(vec![
            ("name".into(), json!("alice")),
            ("meta".into(), json!({"plan": "pro"})),
            ("skipped".into(), json!(null)),
            ("avatar".into(), json!("data:image/gif;base64,AAAA")),
        ]),
        Some(5000),
    )
    .await
    .unwrap();

    assert_eq!(response.status, 200);
    match response.data {
        ResponseData::Object(map) => assert_eq!(map["ok"], true),
        other => panic!("expected object body, got {other:?}"),
    }

    let request = server.await.unwrap();
    let text = String::from_utf8_lossy(&request);
    assert!(text.to_lowercase().contains("x-request-id: 42"));
    assert!(text.contains("name=\"meta\"\r\n\r\n{\"plan\":\"pro\"}\r\n"));
    assert!(!text.contains("name=\"skipped\""));
    assert!(text.contains("filename=\"avatar.gif\""));
}

#[tokio::test]
async fn test_plugin_spawned_upload_resolves() {
    let (url, _server) =
        serve_once("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok").await;

    let handle = plugin::spawn_upload_form_data(
        Some(url),
        None,
        Some(vec![("k".into(), json!("v"))]),
        None,
    );

    let response = handle.await.unwrap().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data, ResponseData::Text("ok".into()));
}
