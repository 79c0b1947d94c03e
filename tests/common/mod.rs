//! Shared utilities for integration testing: a programmable mock
//! inference service speaking just enough HTTP/1.1.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the mock should do with one request.
pub enum MockReply {
    Respond { status: u16, body: String },
    /// Accept the request and never answer (simulates a stuck remote).
    Hang,
}

impl MockReply {
    pub fn json(status: u16, body: &str) -> Self {
        MockReply::Respond {
            status,
            body: body.to_string(),
        }
    }
}

/// Handle to a running mock service.
pub struct MockService {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    hits: Arc<Mutex<Vec<Instant>>>,
}

impl MockService {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests fully received so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Instants at which each request was received, in order.
    #[allow(dead_code)]
    pub fn hit_times(&self) -> Vec<Instant> {
        self.hits.lock().unwrap().clone()
    }
}

/// Start a mock service on an ephemeral port. The closure receives the
/// zero-based index of the request and decides the reply.
pub async fn start_mock_service<F, Fut>(f: F) -> MockService
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let calls = Arc::new(AtomicU32::new(0));
    let hits = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let task_calls = calls.clone();
    let task_hits = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let calls = task_calls.clone();
                    let hits = task_hits.clone();
                    tokio::spawn(async move {
                        if read_request(&mut socket).await.is_err() {
                            return;
                        }
                        let index = calls.fetch_add(1, Ordering::SeqCst);
                        hits.lock().unwrap().push(Instant::now());

                        match f(index).await {
                            MockReply::Respond { status, body } => {
                                let response = format!(
                                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status_line(status),
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            MockReply::Hang => {
                                tokio::time::sleep(Duration::from_secs(120)).await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockService { addr, calls, hits }
}

/// A base URL with nothing listening behind it.
#[allow(dead_code)]
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Read one request: headers, then Content-Length worth of body.
async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        if buf.len() > 64 * 1024 {
            return Err(std::io::ErrorKind::InvalidData.into());
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body_read = buf.len() - header_end;
    while body_read < content_length {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        body_read += n;
    }

    Ok(())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        413 => "413 Payload Too Large",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}
