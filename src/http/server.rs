//! HTTP server: accept loop and per-connection driver.
//!
//! # Responsibilities
//! - Accept connections on one listener (one per reactor core)
//! - Read bytes, run the pipeline, flush queued responses
//! - Close every connection once its requests are answered
//! - Stop accepting on shutdown and drain live connections

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::config::EdgeConfig;
use crate::http::pipeline::{Drive, Pipeline};
use crate::http::response::ResponseWriter;
use crate::net::connection::{ConnState, Connection, ConnectionTracker};
use crate::routing::Router;

/// How long a stopping server waits for open connections.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub read_buffer_size: usize,
    pub max_request_bytes: usize,
    pub idle_timeout: Duration,
}

impl ServerSettings {
    pub fn from_config(config: &EdgeConfig) -> Self {
        Self {
            read_buffer_size: config.server.read_buffer_size,
            max_request_bytes: config.server.max_request_bytes,
            idle_timeout: config.timeouts.idle(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::from_config(&EdgeConfig::default())
    }
}

/// Connection front end shared by all reactor cores.
///
/// Holds only immutable state (router, writer, settings) plus the live
/// connection counter, so one instance can be shared behind an `Arc`.
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    writer: ResponseWriter,
    settings: ServerSettings,
    tracker: ConnectionTracker,
}

impl HttpServer {
    pub fn new(router: Router, writer: ResponseWriter, settings: ServerSettings) -> Self {
        Self {
            router,
            writer,
            settings,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Build a server from configuration.
    pub fn from_config(router: Router, config: &EdgeConfig) -> Self {
        Self::new(
            router,
            ResponseWriter::new(config.server.name.clone()),
            ServerSettings::from_config(config),
        )
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Live connections across every listener of this server.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }

    /// Accept connections until a shutdown signal arrives.
    ///
    /// Each connection becomes a task on the current runtime; with a
    /// current-thread runtime per core, a connection never leaves its core.
    pub async fn serve(
        self: Arc<Self>,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server accepting");

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let server = Arc::clone(&self);
                            tokio::spawn(async move {
                                server.handle_connection(stream, peer).await;
                            });
                        }
                        Err(e) => {
                            // Accept errors (EMFILE, resets) are transient for the listener.
                            tracing::warn!(error = %e, "Accept failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!(address = %addr, "Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        drop(listener);
        let remaining = self.tracker.drain(DRAIN_TIMEOUT).await;
        if remaining > 0 {
            tracing::warn!(remaining, "Connections still open after drain timeout");
        }
        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }

    /// Serve one connection: read, pipeline, flush, close.
    pub async fn handle_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let mut conn = Connection::new(self.settings.read_buffer_size);
        let _guard = self.tracker.track(conn.id());
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(connection_id = %conn.id(), error = %e, "set_nodelay failed");
        }
        tracing::debug!(connection_id = %conn.id(), peer = %peer, "Connection accepted");

        let pipeline = Pipeline::new(
            &self.router,
            &self.writer,
            self.settings.max_request_bytes,
        );

        loop {
            let read = tokio::time::timeout(
                self.settings.idle_timeout,
                stream.read_buf(&mut conn.read_buf),
            )
            .await;

            match read {
                Ok(Ok(0)) => {
                    if !conn.unconsumed().is_empty() {
                        tracing::debug!(
                            connection_id = %conn.id(),
                            buffered = conn.unconsumed().len(),
                            "Peer closed with a partial request"
                        );
                    }
                    break;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::debug!(connection_id = %conn.id(), error = %e, "Read failed");
                    break;
                }
                Err(_) => {
                    tracing::debug!(connection_id = %conn.id(), "Idle timeout");
                    break;
                }
            }

            conn.transition(ConnState::Parsing);
            let drive = pipeline.drive(&mut conn).await;

            if let Err(e) = flush(&mut stream, &mut conn).await {
                tracing::debug!(connection_id = %conn.id(), error = %e, "Write failed");
                break;
            }

            match drive {
                Drive::Incomplete => conn.transition(ConnState::Open),
                Drive::Exhausted | Drive::Abort => break,
            }
        }

        conn.transition(ConnState::Closed);
        let _ = stream.shutdown().await;
        tracing::debug!(connection_id = %conn.id(), served = conn.served, "Connection finished");
    }
}

/// Write every queued response.
async fn flush(stream: &mut TcpStream, conn: &mut Connection) -> Result<(), std::io::Error> {
    if conn.outbound.is_empty() {
        return Ok(());
    }
    let out = conn.take_outbound();
    stream.write_all(&out).await?;
    stream.flush().await
}
