//! Response serialization.
//!
//! # Responsibilities
//! - Build complete HTTP/1.1 responses into a connection's outbound buffer
//! - Fixed header set: Server, Content-Type, Date, Content-Length
//!
//! # Design Decisions
//! - No chunking, compression or keep-alive negotiation
//! - Every response implies the connection closes after it is sent
//! - Date is taken from the wall clock at write time (RFC 1123)

use hyper::StatusCode;
use std::time::SystemTime;

/// Body of the generic failure response for malformed requests.
pub const BAD_REQUEST_BODY: &str = r#"{"error":"Bad Request"}"#;

/// Writes responses for one server identity.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    server_name: String,
}

impl ResponseWriter {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Append a full response to `out`.
    pub fn write(&self, out: &mut Vec<u8>, status: StatusCode, body: &[u8]) {
        self.write_at(out, status, body, SystemTime::now());
    }

    /// Append the fixed response sent for malformed requests.
    pub fn write_bad_request(&self, out: &mut Vec<u8>) {
        self.write(out, StatusCode::BAD_REQUEST, BAD_REQUEST_BODY.as_bytes());
    }

    fn write_at(&self, out: &mut Vec<u8>, status: StatusCode, body: &[u8], now: SystemTime) {
        let reason = status.canonical_reason().unwrap_or("Unknown");
        let head = format!(
            "HTTP/1.1 {} {}\r\nServer: {}\r\nContent-Type: application/json\r\nDate: {}\r\nContent-Length: {}\r\n\r\n",
            status.as_str(),
            reason,
            self.server_name,
            httpdate::fmt_http_date(now),
            body.len(),
        );
        out.reserve(head.len() + body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(body);
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new("ledger-edge")
    }
}
