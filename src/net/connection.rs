//! Connection state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Per-connection record: read buffer, parse cursor, outbound buffer
//! - Track connection state (Open → Parsing → Closed)
//! - Generate unique connection IDs for tracing
//! - Count live connections for shutdown draining

use bytes::{Buf, BytesMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Accepted, waiting for bytes.
    Open,
    /// The pipeline is working through buffered bytes.
    Parsing,
    /// Terminal: responses flushed or the connection failed.
    Closed,
}

/// Mutable state of one accepted socket.
///
/// Owned by the task serving the socket, so it is only ever touched by the
/// reactor core running that task.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: ConnState,
    /// Bytes read and not yet discarded.
    pub read_buf: BytesMut,
    /// Start of the first request not yet dispatched.
    pub cursor: usize,
    /// Responses waiting to be written, in request order.
    pub outbound: Vec<u8>,
    /// Requests answered over the connection's lifetime.
    pub served: u64,
}

impl Connection {
    pub fn new(read_buffer_size: usize) -> Self {
        Self {
            id: ConnectionId::new(),
            state: ConnState::Open,
            read_buf: BytesMut::with_capacity(read_buffer_size),
            cursor: 0,
            outbound: Vec::new(),
            served: 0,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    /// Move to `next`. Closed is terminal.
    pub fn transition(&mut self, next: ConnState) {
        if self.state == ConnState::Closed {
            return;
        }
        tracing::trace!(connection_id = %self.id, from = ?self.state, to = ?next, "Connection state");
        self.state = next;
    }

    /// Bytes after the cursor.
    pub fn unconsumed(&self) -> &[u8] {
        &self.read_buf[self.cursor..]
    }

    /// Drop dispatched bytes and reset the cursor to the buffer start.
    pub fn compact(&mut self) {
        self.read_buf.advance(self.cursor);
        self.cursor = 0;
    }

    /// Take the queued responses, leaving the outbound buffer empty.
    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

/// Counts live connections on one server.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active connection. Returns a guard that decrements on drop.
    pub fn track(&self, id: ConnectionId) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        crate::observability::metrics::connection_opened();
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id,
        }
    }

    /// Get current active connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until all connections are closed or the deadline passes.
    /// Returns the number still open.
    pub async fn drain(&self, deadline: Duration) -> u64 {
        let wait = async {
            while self.active_count() > 0 {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        };
        let _ = tokio::time::timeout(deadline, wait).await;
        self.active_count()
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        crate::observability::metrics::connection_closed();
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
