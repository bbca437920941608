//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline → Router ("/" → ForwardHandler)
//!     → load_balancer (next backend, round robin)
//!     → forward.rs (rebuild request, await backend)
//!     → Reply (backend status + body) → ResponseWriter
//! ```

pub mod forward;

pub use forward::{build_upstream_request, ForwardError, ForwardHandler, HttpClient};
