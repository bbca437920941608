//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → CLI flags override individual fields
//!     → validation.rs (semantic checks)
//!     → EdgeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no runtime reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BalancerConfig, EdgeConfig, ListenerConfig, ObservabilityConfig, ServerConfig, TimeoutConfig,
};
pub use validation::{validate_balancer_config, validate_config, ValidationError};
