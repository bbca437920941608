//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend replica by its base URL
//! - Track requests currently forwarded to it
//!
//! No health state is kept: a backend that is down is still selected in its
//! turn and the failure surfaces when forwarding.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Reasons a configured backend address is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendAddressError {
    #[error("{0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported scheme {0:?}, only http is proxied")]
    Scheme(String),
    #[error("address has no host")]
    MissingHost,
}

/// Turn a configured address into a base URL.
///
/// Bare `host:port` entries get an `http://` scheme.
pub fn normalize_backend_url(address: &str) -> Result<Url, BackendAddressError> {
    let address = address.trim();
    let url = if address.contains("://") {
        Url::parse(address)?
    } else {
        Url::parse(&format!("http://{}", address))?
    };

    if url.scheme() != "http" {
        return Err(BackendAddressError::Scheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(BackendAddressError::MissingHost);
    }
    Ok(url)
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Base URL requests are forwarded to.
    pub base_url: Url,
    /// Requests currently in flight to this backend.
    pub in_flight: AtomicUsize,
    /// Requests forwarded since startup.
    pub forwarded: AtomicU64,
}

impl Backend {
    /// Create a backend from a configured address.
    pub fn new(address: &str) -> Result<Self, BackendAddressError> {
        Ok(Self::from_url(normalize_backend_url(address)?))
    }

    pub fn from_url(base_url: Url) -> Self {
        Self {
            base_url,
            in_flight: AtomicUsize::new(0),
            forwarded: AtomicU64::new(0),
        }
    }

    /// Absolute URI for a request path (path may carry a query string).
    pub fn target(&self, path: &str) -> String {
        let origin = self.base_url.as_str().trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", origin, path)
        } else {
            format!("{}/{}", origin, path)
        }
    }

    /// Current number of in-flight requests.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Mark a request as in flight. The guard releases it on drop.
    pub fn track(self: &Arc<Self>) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            backend: self.clone(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url.as_str().trim_end_matches('/'))
    }
}

/// A RAII guard that manages the in-flight count.
#[derive(Debug)]
pub struct InFlightGuard {
    pub backend: Arc<Backend>,
}

impl Deref for InFlightGuard {
    type Target = Backend;
    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.backend.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_port_gets_http() {
        let url = normalize_backend_url("api01:3000").unwrap();
        assert_eq!(url.as_str(), "http://api01:3000/");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            normalize_backend_url("https://api01:3000"),
            Err(BackendAddressError::Scheme("https".into()))
        );
    }

    #[test]
    fn target_joins_path_and_query() {
        let backend = Backend::new("http://api02:3000/").unwrap();
        assert_eq!(
            backend.target("/clientes/1/extrato?x=1"),
            "http://api02:3000/clientes/1/extrato?x=1"
        );
        assert_eq!(backend.to_string(), "http://api02:3000");
    }

    #[test]
    fn guard_tracks_in_flight() {
        let backend = Arc::new(Backend::new("127.0.0.1:8080").unwrap());
        let guard = backend.track();
        assert_eq!(backend.in_flight(), 1);
        drop(guard);
        assert_eq!(backend.in_flight(), 0);
        assert_eq!(backend.forwarded.load(Ordering::Relaxed), 1);
    }
}
