//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     register(prefix, handler) in order, most specific first
//!     → Router (frozen, shared by every reactor core)
//!
//! Per request:
//!     path → router.rs (first registered literal prefix)
//!     → Handler, or NotFound (404, JSON error body)
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always resolves to the same handler
//! - First match wins (registration order)

pub mod router;

pub use router::{NotFound, Route, Router, RouterError};
