//! Forwarding handler for the balancer.
//!
//! # Responsibilities
//! - Pick the next backend from the round-robin pool
//! - Rebuild the request (method, path, non-empty headers, body) for it
//! - Relay the backend status and body through the response writer
//!
//! # Design Decisions
//! - The outbound call is awaited, not blocked on: the client connection
//!   suspends and the reactor core keeps serving others
//! - No retry and no failover: a failed call fails the client request
//! - `Host` is not copied; the client derives it from the backend address

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};
use http::{Method, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::TimeoutConfig;
use crate::http::handler::{Handler, HandlerError, Reply};
use crate::http::request::Request;
use crate::load_balancer::{Backend, BackendPool};
use crate::observability::metrics;

/// Outbound HTTP client shared by every reactor core.
pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// Ways forwarding to a backend can fail.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid method {0:?}")]
    Method(String),
    #[error("invalid upstream uri {uri:?}: {source}")]
    Uri {
        uri: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    #[error("cannot build upstream request: {0}")]
    Request(#[from] http::Error),
    #[error("backend request failed: {0}")]
    Send(#[from] hyper_util::client::legacy::Error),
    #[error("reading backend response failed: {0}")]
    Body(#[from] hyper::Error),
    #[error("backend timed out")]
    Timeout,
}

/// Handler that proxies every request to the next backend in the pool.
#[derive(Debug, Clone)]
pub struct ForwardHandler {
    pool: Arc<BackendPool>,
    client: HttpClient,
    request_timeout: Duration,
}

impl ForwardHandler {
    pub fn new(pool: Arc<BackendPool>, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            pool,
            client,
            request_timeout: timeouts.request(),
        }
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Send `request` to the next backend and collect its response.
    pub async fn forward(&self, request: &Request) -> Result<Reply, ForwardError> {
        let backend = self.pool.next();
        let backend_label = backend.to_string();
        metrics::record_backend_selection(&backend_label);

        let guard = backend.track();
        tracing::debug!(
            backend = %backend_label,
            method = %request.method,
            path = %request.path,
            in_flight = guard.in_flight(),
            "Forwarding request"
        );

        let outbound = build_upstream_request(&guard, request)?;
        let exchange = async {
            let response = self.client.request(outbound).await?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await?.to_bytes();
            Ok::<_, ForwardError>(Reply::new(parts.status, body))
        };

        let result = match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout),
        };

        match &result {
            Ok(reply) => tracing::debug!(
                backend = %backend_label,
                status = reply.status.as_u16(),
                "Backend responded"
            ),
            Err(e) => {
                metrics::record_upstream_failure(&backend_label);
                tracing::error!(backend = %backend_label, error = %e, "Upstream error");
            }
        }
        result
    }
}

impl Handler for ForwardHandler {
    fn call<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Reply, HandlerError>> {
        async move { self.forward(request).await.map_err(HandlerError::from) }.boxed()
    }
}

/// Rebuild `request` for `backend`: same method, path, body and every
/// header with a non-empty value except `Host`.
pub fn build_upstream_request(
    backend: &Backend,
    request: &Request,
) -> Result<http::Request<Full<Bytes>>, ForwardError> {
    let method = Method::from_bytes(request.method.as_bytes())
        .map_err(|_| ForwardError::Method(request.method.clone()))?;

    let target = backend.target(&request.path);
    let uri: Uri = target
        .parse()
        .map_err(|source| ForwardError::Uri { uri: target.clone(), source })?;

    let mut builder = http::Request::builder().method(method).uri(uri);
    for header in &request.headers {
        if header.value.is_empty() || header.is("host") {
            continue;
        }
        builder = builder.header(header.name.as_str(), header.value.as_slice());
    }

    Ok(builder.body(Full::new(request.body.clone()))?)
}
