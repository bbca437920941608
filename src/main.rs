//! Ingress server.
//!
//! ```text
//! client ──TCP──▶ reactor core (one per CPU, SO_REUSEPORT)
//!                   │ read → parse → route → handler → write
//!                   ▼
//!                 /hello, /clientes/{id}/{transacoes,extrato}
//! ```
//!
//! Example: `ledger-edge --port 8080 --multicore true`

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ledger_edge::config::{load_config, validate_config, ConfigError, EdgeConfig};
use ledger_edge::handlers::ingress_router;
use ledger_edge::http::HttpServer;
use ledger_edge::lifecycle::{init_observability, run_until_signal};
use ledger_edge::observability::logging;

#[derive(Debug, Parser)]
#[command(name = "ledger-edge")]
#[command(about = "Event-driven HTTP/1.1 ingress server", long_about = None)]
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

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<EdgeConfig, ConfigError> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(multicore) = self.multicore {
            config.listener.multicore = multicore;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        validate_config(&config)?;
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
    tracing::info!(
        address = %config.listener.bind_address(),
        multicore = config.listener.multicore,
        cores = config.listener.cores(),
        "ledger-edge starting"
    );

    let router = match ingress_router() {
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
            tracing::error!(error = %e, "Server exited with error");
            ExitCode::FAILURE
        }
    }
}
