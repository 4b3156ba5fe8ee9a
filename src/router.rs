//! Radix-tree request router with an ordered middleware stack.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps every request, routed or not, so a timing
//! log also covers requests that end in `404`.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::middleware::{BoxedMiddleware, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Arc<Vec<BoxedMiddleware>>,
    fallback: BoxedHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Arc::new(Vec::new()),
            fallback: not_found.into_boxed_handler(),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use lapse::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Handler for requests no route matches. Defaults to `404 Not Found`.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Appends a middleware to the stack.
    ///
    /// The first layer registered is the outermost: it sees the request
    /// first and the response last.
    ///
    /// ```rust,no_run
    /// use lapse::Router;
    /// use lapse::middleware::{CorrelationId, TimingLog, TimingLogConfig};
    ///
    /// let app = Router::new()
    ///     .layer(CorrelationId::default())
    ///     .layer(TimingLog::new(TimingLogConfig::default()));
    /// ```
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        Arc::make_mut(&mut self.middleware).push(Arc::new(middleware));
        self
    }

    /// Runs one request through the middleware stack and the matching
    /// handler.
    ///
    /// The server calls this for every request; tests can call it directly
    /// without opening a socket.
    pub async fn handle(&self, mut req: Request) -> Result<Response, Error> {
        let endpoint = match self.lookup(&req.method, &req.path) {
            Some((handler, params)) => {
                req.params = params;
                handler
            }
            None => Arc::clone(&self.fallback),
        };

        Next::new(Arc::clone(&self.middleware), endpoint).run(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> StatusCode {
    StatusCode::NOT_FOUND
}
