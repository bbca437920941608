//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     init logging/metrics → bind listeners → start reactor cores
//!
//! Shutdown (shutdown.rs):
//!     trigger → every reactor core stops accepting → drain connections → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans out to every core
//! - Draining is bounded: cores exit after the deadline even with open connections

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_termination;
pub use startup::{init_observability, run_until_signal};
