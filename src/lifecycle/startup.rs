//! Process startup shared by both binaries.
//!
//! # Responsibilities
//! - Initialize logging and the optional metrics endpoint
//! - Start the reactor cores, then block until a termination signal
//! - Trigger shutdown and wait for every core to drain

use std::sync::Arc;

use crate::config::EdgeConfig;
use crate::http::HttpServer;
use crate::lifecycle::{wait_for_termination, Shutdown};
use crate::net::{Reactor, ReactorError};
use crate::observability::{logging, metrics};

/// Install the tracing subscriber and, if enabled, the metrics exporter.
pub fn init_observability(config: &EdgeConfig) {
    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }
}

/// Serve until SIGINT/SIGTERM, then shut every core down.
pub fn run_until_signal(server: Arc<HttpServer>, config: &EdgeConfig) -> Result<(), ReactorError> {
    let shutdown = Shutdown::new();
    let reactor = Reactor::start(server, &config.listener, &shutdown)?;

    let signals = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| ReactorError::Io { core: reactor.cores(), source })?;
    signals.block_on(wait_for_termination());

    shutdown.trigger();
    reactor.join()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
