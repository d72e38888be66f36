#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tprovider::{ProviderError, ProviderKind, ProviderOperationHooks};

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body should be JSON")
    }
}

/// Serves exactly one canned HTTP/1.1 response on a loopback port.
pub async fn serve_once(response: String) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let address = listener.local_addr().expect("listener address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        let captured = read_request(&mut socket).await;
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = socket.shutdown().await;
        captured
    });

    (format!("http://{address}"), handle)
}

/// Writes `response` and leaves the connection open, then reports what the next read
/// from the client returns. `Ok(0)` means the client closed its end.
pub async fn serve_and_watch(
    response: String,
) -> (String, JoinHandle<std::io::Result<usize>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let address = listener.local_addr().expect("listener address");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept connection");
        read_request(&mut socket).await;
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");

        let mut rest = [0_u8; 64];
        tokio::time::timeout(Duration::from_secs(5), socket.read(&mut rest))
            .await
            .expect("client should close the connection")
    });

    (format!("http://{address}"), handle)
}

/// Returns a base URL on which nothing is listening.
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let address = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{address}")
}

pub fn http_response(status: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];

    loop {
        let read = socket.read(&mut chunk).await.expect("read request");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(header_end) = find_header_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            if buffer.len() >= header_end + 4 + content_length {
                let body = String::from_utf8_lossy(
                    &buffer[header_end + 4..header_end + 4 + content_length],
                )
                .to_string();
                return CapturedRequest { head, body };
            }
        }
    }

    CapturedRequest {
        head: String::from_utf8_lossy(&buffer).to_string(),
        body: String::new(),
    }
}

/// Declares `declared_length` bytes but only carries `body`; the server hangs up early.
pub fn truncated_response(content_type: &str, body: &str, declared_length: usize) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nContent-Length: {declared_length}\r\n\r\n{body}"
    )
}

/// Starts a chunked response carrying `body` as one chunk, without the terminating chunk.
pub fn open_chunked_response(content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{body}\r\n",
        body.len()
    )
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

#[derive(Debug, Default)]
pub struct RecordingHooks {
    pub decode_warnings: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<ProviderError>>,
    pub successes: Mutex<Vec<String>>,
}

impl RecordingHooks {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ProviderOperationHooks for RecordingHooks {
    fn on_success(&self, _provider: ProviderKind, operation: &str, _elapsed: Duration) {
        self.successes
            .lock()
            .expect("successes lock")
            .push(operation.to_string());
    }

    fn on_failure(&self, _provider: ProviderKind, _operation: &str, error: &ProviderError) {
        self.failures
            .lock()
            .expect("failures lock")
            .push(error.clone());
    }

    fn on_decode_warning(&self, _provider: ProviderKind, line: &str, _reason: &str) {
        self.decode_warnings
            .lock()
            .expect("warnings lock")
            .push(line.to_string());
    }
}
