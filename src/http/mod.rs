//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! bytes read from a connection
//!     → parser.rs (request line + headers, Content-Length framing)
//!     → pipeline.rs (every complete request in the buffer, in order)
//!     → router → handler.rs (Reply or HandlerError)
//!     → response.rs (status line + fixed headers + body, queued)
//!     → server.rs (one flush per read, then close or keep reading)
//! ```
//!
//! # Design Decisions
//! - Bodies are framed by Content-Length only; chunked input is rejected
//! - Responses are queued in request order and flushed together
//! - No keep-alive: the connection closes once buffered requests are answered

pub mod handler;
pub mod parser;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{Handler, HandlerError, Reply};
pub use parser::{parse_request, ParseError, ParseStatus, ParsedRequest};
pub use pipeline::{Drive, Pipeline};
pub use request::{Header, Request};
pub use response::ResponseWriter;
pub use server::{HttpServer, ServerSettings};
