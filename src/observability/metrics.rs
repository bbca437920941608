//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_requests_total` (counter): answered requests by method, status
//! - `edge_request_duration_seconds` (histogram): handler latency
//! - `edge_parse_errors_total` (counter): rejected malformed requests
//! - `edge_active_connections` (gauge): current connection count
//! - `edge_backend_selections_total` (counter): round-robin picks by backend
//! - `edge_upstream_failures_total` (counter): failed forwards by backend
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! [`init_metrics`] installs the Prometheus recorder.

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with an HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "edge_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("edge_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_parse_error() {
    counter!("edge_parse_errors_total").increment(1);
}

pub fn connection_opened() {
    gauge!("edge_active_connections").increment(1.0);
}

pub fn connection_closed() {
    gauge!("edge_active_connections").decrement(1.0);
}

pub fn record_backend_selection(backend: &str) {
    counter!("edge_backend_selections_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_upstream_failure(backend: &str) {
    counter!("edge_upstream_failures_total", "backend" => backend.to_string()).increment(1);
}
