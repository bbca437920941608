//! Backend pool management.
//!
//! # Responsibilities
//! - Hold the ordered, fixed set of backends built at startup
//! - Hand out the next backend in strict rotation

use std::sync::Arc;
use thiserror::Error;

use crate::load_balancer::backend::{Backend, BackendAddressError};
use crate::load_balancer::round_robin::RoundRobin;

/// Error type for pool construction.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("backend pool is empty")]
    Empty,
    #[error("invalid backend {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: BackendAddressError,
    },
}

/// Ordered backend set with a shared rotation cursor.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    cursor: RoundRobin,
}

impl BackendPool {
    /// Build a pool from configured addresses, keeping their order.
    pub fn new<S: AsRef<str>>(addresses: &[S]) -> Result<Self, PoolError> {
        let backends = addresses
            .iter()
            .map(|address| {
                let address = address.as_ref();
                Backend::new(address)
                    .map(Arc::new)
                    .map_err(|source| PoolError::Address {
                        address: address.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_backends(backends)
    }

    pub fn from_backends(backends: Vec<Arc<Backend>>) -> Result<Self, PoolError> {
        if backends.is_empty() {
            return Err(PoolError::Empty);
        }
        for backend in &backends {
            tracing::debug!(backend = %backend, "Backend registered");
        }
        Ok(Self {
            backends,
            cursor: RoundRobin::new(),
        })
    }

    /// Select the next backend. Safe to call from every reactor core.
    pub fn next(&self) -> Arc<Backend> {
        // The pool is never empty, so there is always an index.
        let index = self.cursor.next_index(self.backends.len()).unwrap_or(0);
        self.backends[index].clone()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// All backends in configured order.
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }
}
