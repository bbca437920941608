//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! ingress and the balancer. All types derive Serde traits for
//! deserialization from TOML files; every field has a default so a missing
//! file or a partial one is always usable.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration for an edge process.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, reactor cores).
    pub listener: ListenerConfig,

    /// Connection handling and response settings.
    pub server: ServerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Backend pool for the balancer.
    pub balancer: BalancerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Run one reactor per core instead of a single one.
    pub multicore: bool,

    /// Number of reactor cores when `multicore` is set.
    /// Defaults to the available parallelism.
    pub workers: Option<usize>,

    /// Listen backlog for each reactor socket.
    pub backlog: i32,
}

impl ListenerConfig {
    /// Combined `host:port` string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_address().parse()
    }

    /// Number of reactor cores to start.
    pub fn cores(&self) -> usize {
        if !self.multicore {
            return 1;
        }
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            multicore: true,
            workers: None,
            backlog: 1024,
        }
    }
}

/// Connection handling settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Value of the `Server:` response header.
    pub name: String,

    /// Initial capacity of each connection's read buffer.
    pub read_buffer_size: usize,

    /// Largest accepted request (headers plus body) in bytes.
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "ledger-edge".to_string(),
            read_buffer_size: 4096,
            max_request_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Backend request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Client inactivity timeout in seconds.
    pub idle_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Backend pool configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Ordered backend base addresses (e.g., "http://api01:3000" or "api01:3000").
    pub backends: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_core_ignores_workers() {
        let listener = ListenerConfig {
            multicore: false,
            workers: Some(8),
            ..ListenerConfig::default()
        };
        assert_eq!(listener.cores(), 1);
    }

    #[test]
    fn multicore_uses_explicit_workers() {
        let listener = ListenerConfig {
            workers: Some(3),
            ..ListenerConfig::default()
        };
        assert_eq!(listener.cores(), 3);
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let listener = ListenerConfig::default();
        assert_eq!(listener.bind_address(), "127.0.0.1:3000");
        assert!(listener.socket_addr().is_ok());
    }
}
