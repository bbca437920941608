//! Round-robin reverse proxy.
//!
//! Every request, whatever its path, is forwarded to the next backend in
//! the pool and the backend's status and body are relayed to the client.
//! A backend failure closes the client connection without a response.
//!
//! Example: `edge-balancer --port 9999 --backend api01:3000 --backend api02:3000`

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ledger_edge::config::{load_config, validate_balancer_config, ConfigError, EdgeConfig};
use ledger_edge::http::HttpServer;
use ledger_edge::lifecycle::{init_observability, run_until_signal};
use ledger_edge::observability::logging;
use ledger_edge::load_balancer::BackendPool;
use ledger_edge::proxy::ForwardHandler;
use ledger_edge::routing::Router;

const DEFAULT_BACKENDS: [&str; 2] = ["api01:3000", "api02:3000"];

#[derive(Debug, Parser)]
#[command(name = "edge-balancer")]
#[command(about = "Round-robin HTTP/1.1 load balancer", long_about = None)]
struct Cli {
    /// Server port
    #[arg(long)]
    port: Option<u16>,

    /// Run one reactor per CPU core
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    multicore: Option<bool>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Backend address, in rotation order (repeatable)
    #[arg(short, long = "backend")]
    backends: Vec<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<EdgeConfig, ConfigError> {
        let mut config = match self.config.as_deref() {
            Some(path) => load_config(Some(path))?,
            None => {
                let mut config = EdgeConfig::default();
                config.listener.host = "0.0.0.0".to_string();
                config.listener.port = 9999;
                config.server.name = "edge-balancer".to_string();
                config
            }
        };
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(multicore) = self.multicore {
            config.listener.multicore = multicore;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if !self.backends.is_empty() {
            config.balancer.backends = self.backends;
        }
        if config.balancer.backends.is_empty() {
            config.balancer.backends = DEFAULT_BACKENDS.iter().map(|b| b.to_string()).collect();
        }
        validate_balancer_config(&config)?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging("info");
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    init_observability(&config);

    let pool = match BackendPool::new(config.balancer.backends.as_slice()) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            tracing::error!(error = %e, "Invalid backend pool");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        address = %config.listener.bind_address(),
        backends = ?config.balancer.backends,
        cores = config.listener.cores(),
        "edge-balancer starting"
    );

    let forward = ForwardHandler::new(pool, &config.timeouts);
    let router = match Router::new().route("/", forward) {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(error = %e, "Invalid route table");
            return ExitCode::FAILURE;
        }
    };

    let server = Arc::new(HttpServer::from_config(router, &config));
    match run_until_signal(server, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Balancer exited with error");
            ExitCode::FAILURE
        }
    }
}
