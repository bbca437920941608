//! Per-core reactors.
//!
//! Each core gets its own OS thread running a current-thread Tokio runtime
//! and its own SO_REUSEPORT listener. A connection accepted by a core is
//! served by a task on that core's runtime only, so per-connection state
//! is never shared between threads.

use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::http::server::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::listener::{bind_all, ListenerError};

/// Error type for reactor startup and termination.
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error("reactor core {core}: {source}")]
    Io {
        core: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("reactor core {0} panicked")]
    Panicked(usize),
}

/// Handle to running reactor cores.
#[derive(Debug)]
pub struct Reactor {
    cores: Vec<(usize, JoinHandle<Result<(), ReactorError>>)>,
    local_addr: std::net::SocketAddr,
}

impl Reactor {
    /// Bind every listener, then start one reactor thread per core.
    ///
    /// Bind errors are returned before any thread is spawned.
    pub fn start(
        server: Arc<HttpServer>,
        config: &ListenerConfig,
        shutdown: &Shutdown,
    ) -> Result<Self, ReactorError> {
        let listeners = bind_all(config)?;
        let local_addr = listeners[0]
            .local_addr()
            .map_err(|source| ReactorError::Io { core: 0, source })?;

        let mut cores = Vec::with_capacity(listeners.len());
        for (core, listener) in listeners.into_iter().enumerate() {
            let server = Arc::clone(&server);
            let rx = shutdown.subscribe();
            let handle = std::thread::Builder::new()
                .name(format!("reactor-{}", core))
                .spawn(move || run_core(core, server, listener, rx))
                .map_err(|source| ReactorError::Io { core, source })?;
            cores.push((core, handle));
        }

        tracing::info!(
            address = %local_addr,
            cores = cores.len(),
            multicore = config.multicore,
            "Reactor started"
        );
        Ok(Self { cores, local_addr })
    }

    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    pub fn cores(&self) -> usize {
        self.cores.len()
    }

    /// Wait for every core to stop, returning the first failure.
    pub fn join(self) -> Result<(), ReactorError> {
        let mut first_error = None;
        for (core, handle) in self.cores {
            let result = handle.join().unwrap_or(Err(ReactorError::Panicked(core)));
            if let Err(e) = result {
                tracing::error!(core, error = %e, "Reactor core failed");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn run_core(
    core: usize,
    server: Arc<HttpServer>,
    listener: std::net::TcpListener,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), ReactorError> {
    let io = |source| ReactorError::Io { core, source };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(io)?;

    runtime.block_on(async move {
        let listener = TcpListener::from_std(listener).map_err(io)?;
        tracing::debug!(core, "Reactor core running");
        server.serve(listener, shutdown).await.map_err(io)
    })
}
