//! Client identification for `/api` routes
//!
//! Every request whose path is under `/api` must carry an `X-Client-Id`
//! header whose value exactly matches the configured client id. Other paths
//! (such as `/health`) pass through unchecked.
//!
//! # Usage
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use stocks_server::middleware::GuardLayer;
//!
//! let app: Router = Router::new()
//!     .route("/api/ping", get(|| async { "pong" }))
//!     .layer(GuardLayer::client_id("abc123"));
//! ```

use axum::{
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use thiserror::Error;
use tower::{Layer, Service};
use tracing::warn;

use crate::error::AppError;

/// Header carrying the client id (lowercase, as stored by `http`)
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const GUARDED_PREFIX: &str = "/api";

/// Why a request was turned away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardRejection {
    #[error("Missing X-Client-Id header")]
    MissingClientId,

    #[error("Invalid X-Client-Id")]
    InvalidClientId,
}

/// Synchronous admission check run before a request reaches its handler
pub trait RequestGuard: Send + Sync + 'static {
    fn check(&self, headers: &HeaderMap) -> Result<(), GuardRejection>;
}

/// Accepts exactly one client id
#[derive(Debug, Clone)]
pub struct StaticClientIdGuard {
    client_id: String,
}

impl StaticClientIdGuard {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl RequestGuard for StaticClientIdGuard {
    fn check(&self, headers: &HeaderMap) -> Result<(), GuardRejection> {
        let Some(value) = headers.get(CLIENT_ID_HEADER) else {
            return Err(GuardRejection::MissingClientId);
        };
        let value = value.to_str().map_err(|_| GuardRejection::InvalidClientId)?;
        if value.trim().is_empty() {
            return Err(GuardRejection::MissingClientId);
        }
        if value != self.client_id {
            return Err(GuardRejection::InvalidClientId);
        }
        Ok(())
    }
}

fn is_guarded(path: &str) -> bool {
    path == GUARDED_PREFIX
        || path
            .strip_prefix(GUARDED_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Tower layer applying a [`RequestGuard`] to `/api` requests
#[derive(Clone)]
pub struct GuardLayer {
    guard: Arc<dyn RequestGuard>,
}

impl GuardLayer {
    pub fn new(guard: impl RequestGuard) -> Self {
        Self {
            guard: Arc::new(guard),
        }
    }

    /// Layer accepting only `client_id`
    pub fn client_id(client_id: impl Into<String>) -> Self {
        Self::new(StaticClientIdGuard::new(client_id))
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardMiddleware {
            inner,
            guard: self.guard.clone(),
        }
    }
}

/// Service produced by [`GuardLayer`]
#[derive(Clone)]
pub struct GuardMiddleware<S> {
    inner: S,
    guard: Arc<dyn RequestGuard>,
}

impl<S> Service<Request> for GuardMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        if is_guarded(request.uri().path()) {
            if let Err(rejection) = self.guard.check(request.headers()) {
                warn!(
                    method = %request.method(),
                    uri = %request.uri(),
                    reason = %rejection,
                    "Request rejected"
                );
                let response = AppError::Unauthorized(rejection.to_string()).into_response();
                return Box::pin(async move { Ok(response) });
            }
        }

        Box::pin(self.inner.call(request))
    }
}
