//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store registered path prefixes with their handlers
//! - Resolve a request path to a handler, or the not-found handler
//!
//! # Design Decisions
//! - Immutable after construction (shared across cores without locks)
//! - O(n) prefix scan in registration order; first literal prefix wins
//! - Registration order is part of the contract, so a prefix that an
//!   earlier one would always shadow is rejected at registration

use futures_util::future::{self, BoxFuture, FutureExt};
use hyper::StatusCode;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::http::handler::{Handler, HandlerError, Reply};
use crate::http::request::Request;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("prefix {0:?} is already registered")]
    Duplicate(String),
    #[error("prefix {prefix:?} is unreachable behind earlier prefix {by:?}")]
    Shadowed { prefix: String, by: String },
}

/// A registered path handler.
#[derive(Clone)]
pub struct Route {
    pub prefix: String,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("prefix", &self.prefix).finish()
    }
}

/// Ordered prefix router.
#[derive(Clone)]
pub struct Router {
    routes: Vec<Route>,
    not_found: Arc<dyn Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: Arc::new(NotFound),
        }
    }

    /// Register a handler for every path starting with `prefix`.
    ///
    /// More specific prefixes must be registered before more general ones.
    pub fn register(
        &mut self,
        prefix: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<&mut Self, RouterError> {
        let prefix = prefix.into();
        for route in &self.routes {
            if route.prefix == prefix {
                return Err(RouterError::Duplicate(prefix));
            }
            if prefix.starts_with(&route.prefix) {
                return Err(RouterError::Shadowed {
                    prefix,
                    by: route.prefix.clone(),
                });
            }
        }
        tracing::debug!(prefix = %prefix, "Route registered");
        self.routes.push(Route { prefix, handler });
        Ok(self)
    }

    /// Builder form of [`Router::register`].
    pub fn route(
        mut self,
        prefix: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Result<Self, RouterError> {
        self.register(prefix, Arc::new(handler))?;
        Ok(self)
    }

    /// First route whose prefix is a literal prefix of `path`.
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| path.starts_with(&r.prefix))
    }

    /// Handler for `path`, falling back to the not-found handler.
    pub fn resolve(&self, path: &str) -> &Arc<dyn Handler> {
        match self.lookup(path) {
            Some(route) => &route.handler,
            None => &self.not_found,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish()
    }
}

/// Answers 404 with a JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

impl Handler for NotFound {
    fn call<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, HandlerError>> {
        tracing::debug!(path = %request.path, "No route matched");
        future::ready(Ok(Reply::error(StatusCode::NOT_FOUND, "route not found"))).boxed()
    }
}
