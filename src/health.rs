//! Health-check responders.
//!
//! Two flavours, use whichever fits the deployment:
//!
//! | Responder | Answers | Notes |
//! |---|---|---|
//! | [`HealthCheck`] middleware | `/healthcheck` and below | Short-circuits before routing and before any later middleware. |
//! | [`liveness`] handler | wherever you route it | Kubernetes liveness probe, body `"ok"`. |
//! | [`readiness`] handler | wherever you route it | Kubernetes readiness probe, body `"ready"`. |
//!
//! ```rust,no_run
//! use lapse::{Router, health};
//! use lapse::health::HealthCheck;
//!
//! let app = Router::new()
//!     .layer(HealthCheck::new("all systems go"))
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Register `HealthCheck` ahead of [`TimingLog`](crate::middleware::TimingLog)
//! if probe traffic should stay out of the timing log.

use async_trait::async_trait;
use tracing::info;

use crate::error::Error;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Answers health probes with a fixed greeting.
///
/// A request matches when its path equals the configured prefix or
/// continues it with a `/` segment (`/healthcheck`, `/healthcheck/db`, but
/// not `/healthchecks`). The comparison ignores ASCII case.
#[derive(Clone, Debug)]
pub struct HealthCheck {
    path: String,
    greeting: String,
}

impl HealthCheck {
    pub const DEFAULT_PATH: &'static str = "/healthcheck";

    pub fn new(greeting: impl Into<String>) -> Self {
        Self::at(Self::DEFAULT_PATH, greeting)
    }

    pub fn at(path: &str, greeting: impl Into<String>) -> Self {
        Self {
            path: path.trim_end_matches('/').to_owned(),
            greeting: greeting.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let Some(head) = path.get(..self.path.len()) else {
            return false;
        };
        head.eq_ignore_ascii_case(&self.path)
            && matches!(path.as_bytes().get(self.path.len()), None | Some(b'/'))
    }
}

#[async_trait]
impl Middleware for HealthCheck {
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
        if self.matches(req.path()) {
            info!(path = req.path(), "healthcheck requested");
            return Ok(Response::text(self.greeting.clone()));
        }
        next.run(req).await
    }
}

/// Kubernetes liveness probe handler.
///
/// Always `200 OK` with body `"ok"`. If the process can answer HTTP at all,
/// it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// `200 OK` with body `"ready"`. Replace it with your own handler when
/// readiness depends on downstream services.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
