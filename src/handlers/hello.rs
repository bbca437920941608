//! The `/hello` endpoint.

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::http::handler::{Handler, HandlerError, Reply};
use crate::http::request::Request;

const GREETING: &[u8] = br#"{"hello": "Hello World!"}"#;

/// Fixed greeting for `/hello`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hello;

impl Handler for Hello {
    fn call<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, Result<Reply, HandlerError>> {
        future::ready(Ok(Reply::ok(GREETING))).boxed()
    }
}
