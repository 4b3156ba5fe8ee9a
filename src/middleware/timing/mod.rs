//! Request timing.
//!
//! [`TimingLog`] measures how long the rest of the pipeline takes for each
//! request and emits one log line per request that completes.
//!
//! A request that fails downstream produces no timing line at all: the
//! error travels back to the caller untouched, and nothing is recorded for
//! it. Observers that count timing lines must not read them as a request
//! count.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::Error;
use crate::log::{Logger, TracingLogger};
use crate::request::Request;
use crate::response::Response;

use super::{Middleware, Next};

mod config;
mod record;

pub use config::{DEFAULT_TEMPLATE, Format, TimingLogBuilder, TimingLogConfig};
pub use record::LogRecord;

/// Response header carrying the measured duration in milliseconds, when
/// enabled with [`TimingLogBuilder::with_duration_header`].
pub const DURATION_HEADER: &str = "x-request-duration";

/// Logs the duration of every successful pass through the downstream stack.
///
/// ```rust,no_run
/// use lapse::{Router, Severity};
/// use lapse::middleware::{TimingLog, TimingLogConfig};
///
/// let config = TimingLogConfig::builder()
///     .defaults()
///     .with_severity(Severity::Debug)
///     .build()
///     .expect("valid timing config");
///
/// let app = Router::new().layer(TimingLog::new(config));
/// ```
pub struct TimingLog {
    config: Arc<TimingLogConfig>,
    logger: Option<Arc<dyn Logger>>,
}

impl TimingLog {
    /// Emits through [`TracingLogger`].
    pub fn new(config: TimingLogConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingLogger))
    }

    pub fn with_logger(config: TimingLogConfig, logger: Arc<dyn Logger>) -> Self {
        Self { config: Arc::new(config), logger: Some(logger) }
    }

    /// No logging backend: requests are timed but nothing is emitted.
    pub fn silent(config: TimingLogConfig) -> Self {
        Self { config: Arc::new(config), logger: None }
    }

    pub fn config(&self) -> &TimingLogConfig {
        &self.config
    }
}

impl Default for TimingLog {
    fn default() -> Self {
        Self::new(TimingLogConfig::default())
    }
}

#[async_trait]
impl Middleware for TimingLog {
    async fn handle(&self, req: Request, next: Next) -> Result<Response, Error> {
        let correlation_id = req.correlation_id().to_owned();
        let operation = req.path().to_owned();

        let start = Instant::now();
        let mut response = next.run(req).await?;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        let record = LogRecord { operation, duration_ms, correlation_id };

        if let Some(logger) = &self.logger {
            let message = self.config.format().render(&record);
            logger.log_record(self.config.severity(), &record, &message);
        }

        if self.config.duration_header() {
            response.insert_header(DURATION_HEADER, &record.duration_ms.to_string());
        }

        Ok(response)
    }
}
