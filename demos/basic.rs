//! Minimal lapse example — a JSON endpoint behind timing, correlation and
//! health-check middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!   LAPSE_TIMING_LEVEL=warning RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -H 'x-correlation-id: demo-1' http://localhost:3000/users/42
//!   curl http://localhost:3000/healthcheck
//!   curl http://localhost:3000/flaky     # fails downstream: no timing line

use lapse::health::{self, HealthCheck};
use lapse::middleware::{CorrelationId, Next, TimingLog, TimingLogConfig, from_fn};
use lapse::{Error, Request, Response, Router, Server, Severity, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let severity = match std::env::var("LAPSE_TIMING_LEVEL") {
        Ok(level) => level.parse().unwrap_or_else(|e| {
            tracing::warn!("{e}, falling back to information");
            Severity::Information
        }),
        Err(_) => Severity::Information,
    };

    let timing = TimingLogConfig::builder()
        .defaults()
        .with_severity(severity)
        .with_format("request to {operation} took {duration}ms (correlation {correlationId})")
        .with_duration_header(true)
        .build()
        .expect("valid timing configuration");

    let app = Router::new()
        .layer(HealthCheck::new("all systems go"))
        .layer(CorrelationId::default())
        .layer(TimingLog::new(timing))
        .layer(from_fn(refuse_flaky))
        .get("/users/{id}", get_user)
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// Fails every request to /flaky, to show that failed requests are not timed.
async fn refuse_flaky(req: Request, next: Next) -> Result<Response, Error> {
    if req.path().starts_with("/flaky") {
        return Err(Error::middleware("flaky endpoint refused the request"));
    }
    let res = next.run(req).await?;
    if res.status_code() == StatusCode::NOT_FOUND {
        tracing::debug!("no route matched");
    }
    Ok(res)
}
