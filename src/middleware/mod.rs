//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request timing, correlation identifiers, health
//! probes. Each middleware receives the request and a [`Next`] continuation
//! standing for the rest of the stack plus the routed handler.
//!
//! ```text
//! request ─► CorrelationId ─► TimingLog ─► … ─► handler
//! response ◄──────────────────────────────────────┘
//! ```
//!
//! Built-in middleware:
//! - [`TimingLog`] — measures each request and emits one log line per success
//! - [`CorrelationId`] — adopts a client-supplied correlation header
//! - [`HealthCheck`](crate::health::HealthCheck) — answers health probes before routing

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

mod correlation;
mod timing;

pub use correlation::CorrelationId;
pub use timing::{
    DEFAULT_TEMPLATE, DURATION_HEADER, Format, LogRecord, TimingLog, TimingLogBuilder,
    TimingLogConfig,
};

/// A request interceptor.
///
/// Implementations either answer the request themselves or call
/// [`Next::run`] exactly once. An `Err` from `next` should be returned
/// as-is unless the middleware exists to translate it.
///
/// ```rust
/// use lapse::{Error, Request, Response};
/// use lapse::middleware::{Middleware, Next};
///
/// struct PoweredBy;
///
/// #[async_trait::async_trait]
/// impl Middleware for PoweredBy {
///     async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
///         let mut res = next.run(req).await?;
///         res.insert_header("x-powered-by", "lapse");
///         Ok(res)
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error>;
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// The rest of the pipeline, from the current middleware's point of view.
///
/// `run` consumes `self`, so the downstream stack runs at most once per
/// request.
pub struct Next {
    stack: Arc<Vec<BoxedMiddleware>>,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(stack: Arc<Vec<BoxedMiddleware>>, endpoint: BoxedHandler) -> Self {
        Self { stack, index: 0, endpoint }
    }

    /// Passes the request to the next middleware, or to the handler once the
    /// stack is exhausted.
    pub fn run(self, req: Request) -> BoxFuture<Result<Response, Error>> {
        match self.stack.get(self.index).cloned() {
            Some(middleware) => {
                let next = Next { stack: self.stack, index: self.index + 1, endpoint: self.endpoint };
                Box::pin(async move { middleware.handle(req, next).await })
            }
            None => {
                let fut = self.endpoint.call(req);
                Box::pin(async move { Ok(fut.await) })
            }
        }
    }
}

/// Builds a middleware from an async closure.
///
/// ```rust
/// use lapse::{Request, Router};
/// use lapse::middleware::{from_fn, Next};
///
/// let app = Router::new().layer(from_fn(|req: Request, next: Next| async move {
///     tracing::debug!(path = req.path(), "incoming");
///     next.run(req).await
/// }));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    FromFn(f)
}

/// Middleware returned by [`from_fn`].
pub struct FromFn<F>(F);

#[async_trait]
impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
        (self.0)(req, next).await
    }
}
