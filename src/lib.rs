//! # lapse
//!
//! A minimal HTTP framework for services behind a reverse proxy, with the
//! two pieces of middleware every such service ends up writing: request
//! timing and health checks.
//!
//! ## What it does
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - An ordered middleware stack with a single-shot [`Next`](middleware::Next)
//! - [`TimingLog`](middleware::TimingLog): one log line per completed request,
//!   with path, fractional-millisecond duration and correlation id
//! - [`CorrelationId`](middleware::CorrelationId): adopt the caller's
//!   correlation header
//! - [`HealthCheck`](health::HealthCheck) plus Kubernetes probe handlers
//! - Graceful shutdown on SIGTERM / Ctrl-C
//!
//! TLS, body-size limits and rate limiting are left to the proxy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use lapse::{Request, Response, Router, Server, Severity};
//! use lapse::health::HealthCheck;
//! use lapse::middleware::{CorrelationId, TimingLog, TimingLogConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let timing = TimingLogConfig::builder()
//!         .defaults()
//!         .with_severity(Severity::Debug)
//!         .build()
//!         .unwrap();
//!
//!     let app = Router::new()
//!         .layer(HealthCheck::new("ok"))
//!         .layer(CorrelationId::default())
//!         .layer(TimingLog::new(timing))
//!         .get("/users/{id}", get_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod log;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use error::{BoxError, ConfigError, Error};
pub use handler::{BoxFuture, Handler};
pub use http::{Method, StatusCode};
pub use log::{Logger, ParseSeverityError, Severity, TracingLogger};
pub use request::{Request, RequestBuilder};
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
