//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     listener.rs (one SO_REUSEPORT socket per core)
//!     → reactor.rs (one thread + current-thread runtime per core)
//!
//! Per core:
//!     accept → connection.rs (typed per-connection state)
//!     → http::server (read / pipeline / flush / close)
//!
//! Connection States:
//!     Open → Parsing → (Open while a request is partial) → Closed
//! ```
//!
//! # Design Decisions
//! - A connection is owned by exactly one core for its whole lifetime
//! - No persistent connections: close after the buffered requests are answered
//! - Bind failures surface before any core starts

pub mod connection;
pub mod listener;
pub mod reactor;

pub use connection::{ConnState, Connection, ConnectionId, ConnectionTracker};
pub use listener::{bind_all, bind_reuseport, ListenerError};
pub use reactor::{Reactor, ReactorError};
