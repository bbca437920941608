//! Shared utilities for integration tests.
//!
//! Every listener binds an ephemeral port so tests can run in parallel.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ledger_edge::http::{HttpServer, ResponseWriter, ServerSettings};
use ledger_edge::lifecycle::Shutdown;
use ledger_edge::routing::Router;

/// A server running on the test runtime. Dropping it stops accepting.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub server: Arc<HttpServer>,
}

/// Serve `router` on 127.0.0.1 with an ephemeral port.
pub async fn spawn_server(router: Router) -> TestServer {
    spawn_server_with(
        router,
        ServerSettings {
            idle_timeout: Duration::from_secs(5),
            ..ServerSettings::default()
        },
    )
    .await
}

/// Serve `router` with explicit connection settings.
pub async fn spawn_server_with(router: Router, settings: ServerSettings) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = Arc::new(HttpServer::new(router, ResponseWriter::default(), settings));
    tokio::spawn(Arc::clone(&server).serve(listener, shutdown.subscribe()));
    TestServer {
        addr,
        shutdown,
        server,
    }
}

/// Send raw bytes, then read until the server closes the connection.
pub async fn exchange(addr: SocketAddr, chunks: &[&[u8]]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    for chunk in chunks {
        stream.write_all(chunk).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let mut response = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("server did not close the connection")
        .unwrap();
    String::from_utf8(response).unwrap()
}

/// Split a byte stream of concatenated responses into (status, body) pairs.
pub fn split_responses(mut raw: &str) -> Vec<(u16, String)> {
    let mut out = Vec::new();
    while let Some(head_end) = raw.find("\r\n\r\n") {
        let head = &raw[..head_end];
        let status = head[9..12].parse().unwrap();
        let length: usize = head
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        let body_start = head_end + 4;
        out.push((status, raw[body_start..body_start + length].to_string()));
        raw = &raw[body_start + length..];
    }
    out
}

/// Requests observed by a mock backend, as (backend name, path).
pub type Hits = Arc<Mutex<Vec<(String, String)>>>;

/// Start a mock backend that answers every request with `status` and a
/// body naming the backend. Returns its address.
pub async fn start_mock_backend(name: &str, status: u16, hits: Hits) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let name = name.to_string();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let name = name.clone();
            let hits = hits.clone();
            tokio::spawn(async move {
                let _ = serve_mock(socket, &name, status, hits).await;
            });
        }
    });
    addr
}

async fn serve_mock(
    mut socket: TcpStream,
    name: &str,
    status: u16,
    hits: Hits,
) -> std::io::Result<()> {
    loop {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let length: usize = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.eq_ignore_ascii_case("content-length").then(|| v.trim().parse().ok())?
            })
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let path = head.split_whitespace().nth(1).unwrap_or("").to_string();
        hits.lock().unwrap().push((name.to_string(), path));

        let body = format!(r#"{{"backend":"{}"}}"#, name);
        let reason = match status {
            200 => "OK",
            201 => "Created",
            404 => "Not Found",
            422 => "Unprocessable Entity",
            _ => "Internal Server Error",
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await?;
    }
}

/// An address with nothing listening on it.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
