//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Balancer config (ordered backend addresses)
//!     → backend.rs (normalize to base URLs)
//!     → pool.rs (fixed ordered set, built once)
//!     → round_robin.rs (atomic read-and-increment cursor)
//!     → next backend for the forwarding handler
//! ```
//!
//! # Design Decisions
//! - Strict round robin, no weights and no health filtering
//! - The cursor is the only state shared across reactor cores
//! - Fair in aggregate; which racing request gets which slot is unspecified

pub mod backend;
pub mod pool;
pub mod round_robin;

pub use backend::{Backend, BackendAddressError, InFlightGuard};
pub use pool::{BackendPool, PoolError};
pub use round_robin::RoundRobin;
