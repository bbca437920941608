//! Pipelined request processing for one connection.
//!
//! # Data Flow
//! ```text
//! read event appended bytes to Connection.read_buf
//!     → loop over the window after the cursor:
//!         parser.rs (next request head)
//!         → wait for the whole body (header_len + Content-Length)
//!         → advance cursor past the body
//!         → Router → Handler → ResponseWriter (append to outbound)
//!     → compact the read buffer
//! ```
//!
//! Responses are appended in the order requests appear in the buffer.

use bytes::Bytes;
use std::time::Instant;

use crate::http::parser::{parse_request, ParseStatus};
use crate::http::response::ResponseWriter;
use crate::net::connection::Connection;
use crate::observability::metrics;
use crate::routing::Router;

/// What the connection should do after a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Every buffered byte was dispatched and at least one request answered.
    Exhausted,
    /// A request is still partial; keep reading.
    Incomplete,
    /// Protocol failure; flush what is queued and close.
    Abort,
}

/// Drives buffered bytes through routing and response writing.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    router: &'a Router,
    writer: &'a ResponseWriter,
    max_request_bytes: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(router: &'a Router, writer: &'a ResponseWriter, max_request_bytes: usize) -> Self {
        Self {
            router,
            writer,
            max_request_bytes,
        }
    }

    /// Dispatch every complete request in the connection's read buffer.
    pub async fn drive(&self, conn: &mut Connection) -> Drive {
        let outcome = self.dispatch_all(conn).await;
        conn.compact();
        outcome
    }

    async fn dispatch_all(&self, conn: &mut Connection) -> Drive {
        let mut dispatched = 0usize;

        loop {
            let window = conn.unconsumed();
            if window.is_empty() {
                return if dispatched > 0 {
                    Drive::Exhausted
                } else {
                    Drive::Incomplete
                };
            }

            let parsed = match parse_request(window) {
                Ok(ParseStatus::Complete(parsed)) => parsed,
                Ok(ParseStatus::Incomplete) => {
                    if window.len() > self.max_request_bytes {
                        tracing::warn!(
                            connection_id = %conn.id(),
                            buffered = window.len(),
                            "Request head exceeds limit"
                        );
                        return self.reject(conn);
                    }
                    return Drive::Incomplete;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn.id(), error = %e, "Malformed request");
                    return self.reject(conn);
                }
            };

            let frame_len = parsed.frame_len();
            if frame_len > self.max_request_bytes {
                tracing::warn!(
                    connection_id = %conn.id(),
                    content_length = parsed.content_length,
                    "Request body exceeds limit"
                );
                return self.reject(conn);
            }
            if window.len() < frame_len {
                tracing::trace!(
                    connection_id = %conn.id(),
                    buffered = window.len(),
                    needed = frame_len,
                    "Waiting for request body"
                );
                return Drive::Incomplete;
            }

            let body = Bytes::copy_from_slice(&window[parsed.header_len..frame_len]);
            conn.cursor += frame_len;
            let request = parsed.into_request(body);

            let start = Instant::now();
            let handler = self.router.resolve(&request.path);
            match handler.call(&request).await {
                Ok(reply) => {
                    self.writer.write(&mut conn.outbound, reply.status, &reply.body);
                    metrics::record_request(&request.method, reply.status.as_u16(), start);
                    tracing::debug!(
                        connection_id = %conn.id(),
                        method = %request.method,
                        path = %request.path,
                        status = reply.status.as_u16(),
                        "Request handled"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %conn.id(),
                        method = %request.method,
                        path = %request.path,
                        error = %e,
                        "Handler aborted request"
                    );
                    return Drive::Abort;
                }
            }

            dispatched += 1;
            conn.served += 1;
        }
    }

    fn reject(&self, conn: &mut Connection) -> Drive {
        metrics::record_parse_error();
        self.writer.write_bad_request(&mut conn.outbound);
        Drive::Abort
    }
}
