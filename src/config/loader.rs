//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::EdgeConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Parse a TOML document. Missing sections take their defaults.
pub fn parse_config(content: &str) -> Result<EdgeConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from a TOML file, or defaults when no path is given.
///
/// Validation is left to the caller since the ingress and the balancer
/// check different things.
pub fn load_config(path: Option<&Path>) -> Result<EdgeConfig, ConfigError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let config = parse_config(&content)?;
            tracing::debug!(path = %path.display(), "Configuration file loaded");
            Ok(config)
        }
        None => Ok(EdgeConfig::default()),
    }
}
