//! Event-driven HTTP/1.1 front end and round-robin reverse proxy.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::EdgeConfig;
pub use crate::http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Reactor;
