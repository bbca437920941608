//! The handler contract between the connection core and request processing.
//!
//! A handler receives a fully delimited [`Request`] and answers with a
//! [`Reply`]. Business failures (bad payload, unknown account) are ordinary
//! replies with a 4xx status. A [`HandlerError`] means no response can be
//! produced at all; the connection is closed without one.

use bytes::Bytes;
use futures_util::future::BoxFuture;
use hyper::StatusCode;
use thiserror::Error;

use crate::http::request::Request;
use crate::proxy::ForwardError;

/// Status and body produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Serialize a JSON value as the body.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// `{"error": "<message>"}` with the given status.
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }
}

/// Failure that leaves a request without any response.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("upstream failure: {0}")]
    Upstream(#[from] ForwardError),
}

/// Request processing invoked once per parsed request.
///
/// Handlers must not touch connection or router state; they only see the
/// request. The returned future is the suspension point of the connection:
/// the reactor core keeps serving other connections while it is pending.
pub trait Handler: Send + Sync {
    fn call<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, HandlerError>>;
}
