//! Configuration validation.
//!
//! Serde handles the syntax; this module checks values that parse but cannot
//! work (zero timeouts, unusable bind address, malformed backend URLs).
//! All problems are collected so an operator sees every mistake at once.

use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::load_balancer::backend::normalize_backend_url;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("server.max_request_bytes ({max}) is smaller than server.read_buffer_size ({read})")]
    RequestLimitBelowBuffer { max: usize, read: usize },
    #[error("invalid backend {address:?}: {reason}")]
    Backend { address: String, reason: String },
    #[error("balancer.backends is empty")]
    NoBackends,
}

/// Validate the settings every edge process uses.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address()));
    }
    if config.listener.workers == Some(0) {
        errors.push(ValidationError::Zero("listener.workers"));
    }
    if config.listener.backlog <= 0 {
        errors.push(ValidationError::Zero("listener.backlog"));
    }
    if config.server.read_buffer_size == 0 {
        errors.push(ValidationError::Zero("server.read_buffer_size"));
    }
    if config.server.max_request_bytes < config.server.read_buffer_size {
        errors.push(ValidationError::RequestLimitBelowBuffer {
            max: config.server.max_request_bytes,
            read: config.server.read_buffer_size,
        });
    }

    let timeouts = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.idle_secs", config.timeouts.idle_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::Zero(name));
        }
    }

    for address in &config.balancer.backends {
        if let Err(e) = normalize_backend_url(address) {
            errors.push(ValidationError::Backend {
                address: address.clone(),
                reason: e.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a balancer configuration: the common checks plus a non-empty pool.
pub fn validate_balancer_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_config(config).err().unwrap_or_default();
    if config.balancer.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&EdgeConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut config = EdgeConfig::default();
        config.listener.host = "not an ip".into();
        config.timeouts.idle_secs = 0;
        config.balancer.backends = vec!["ftp://api01:3000".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero("timeouts.idle_secs")));
        assert!(matches!(errors[0], ValidationError::BindAddress(_)));
    }

    #[test]
    fn balancer_requires_backends() {
        let config = EdgeConfig::default();
        let errors = validate_balancer_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoBackends]);

        let mut config = EdgeConfig::default();
        config.balancer.backends = vec!["api01:3000".into(), "http://api02:3000".into()];
        assert!(validate_balancer_config(&config).is_ok());
    }

    #[test]
    fn request_limit_must_cover_read_buffer() {
        let mut config = EdgeConfig::default();
        config.server.read_buffer_size = 8192;
        config.server.max_request_bytes = 1024;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestLimitBelowBuffer { max: 1024, read: 8192 }]
        );
    }
}
