//! TCP listener binding for reactor cores.
//!
//! # Responsibilities
//! - Bind one listening socket per reactor core on the same address
//! - SO_REUSEPORT lets the kernel spread accepted connections across them
//! - Report bind failures before any core starts

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured host/port is not a socket address.
    #[error("invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind a non-blocking listener with address and port reuse.
pub fn bind_reuseport(addr: SocketAddr, backlog: i32) -> Result<std::net::TcpListener, ListenerError> {
    let bind = |source| ListenerError::Bind { addr, source };

    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).map_err(bind)?;
    socket.set_reuse_address(true).map_err(bind)?;
    #[cfg(unix)]
    socket.set_reuse_port(true).map_err(bind)?;
    socket.set_nonblocking(true).map_err(bind)?;
    socket.set_nodelay(true).map_err(bind)?;
    socket.bind(&addr.into()).map_err(bind)?;
    socket.listen(backlog).map_err(bind)?;

    Ok(socket.into())
}

/// Bind one listener per reactor core.
///
/// With port 0 the first socket picks a port and the rest reuse it.
pub fn bind_all(config: &ListenerConfig) -> Result<Vec<std::net::TcpListener>, ListenerError> {
    let mut addr = config.socket_addr().map_err(|source| ListenerError::Address {
        address: config.bind_address(),
        source,
    })?;

    let cores = config.cores();
    let mut listeners = Vec::with_capacity(cores);
    for _ in 0..cores {
        let listener = bind_reuseport(addr, config.backlog)?;
        if addr.port() == 0 {
            addr = listener
                .local_addr()
                .map_err(|source| ListenerError::Bind { addr, source })?;
        }
        listeners.push(listener);
    }

    tracing::info!(address = %addr, cores, "Listeners bound");
    Ok(listeners)
}
