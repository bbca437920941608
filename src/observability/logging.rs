//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins; otherwise the configured level applies to this crate

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a configured level.
pub fn default_directive(level: &str) -> String {
    format!("ledger_edge={level},edge_balancer={level},warn")
}

/// Initialize the global tracing subscriber. Safe to call more than once;
/// later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_scopes_level_to_binaries() {
        assert_eq!(
            default_directive("debug"),
            "ledger_edge=debug,edge_balancer=debug,warn"
        );
        assert!(EnvFilter::try_new(default_directive("info")).is_ok());
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging("info");
        init_logging("debug");
    }
}
