//! Severity levels and the logging capability middleware emits through.
//!
//! Middleware never talks to a logging backend directly. It receives a
//! [`Logger`] at construction and hands it a severity and a rendered
//! message; the backend decides what a severity means. [`TracingLogger`]
//! forwards to [`tracing`], which is what most applications want, and
//! attaches the timing record as structured fields.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::middleware::LogRecord;

/// Ordered log importance: `Trace < Debug < Information < Warning < Error < Critical`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(try_from = "String")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Information,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace       => "trace",
            Self::Debug       => "debug",
            Self::Information => "information",
            Self::Warning     => "warning",
            Self::Error       => "error",
            Self::Critical    => "critical",
        }
    }
}

/// Returned when a string names no known severity.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown severity `{0}`")]
pub struct ParseSeverityError(String);

/// Case-insensitive. Accepts the full names plus `info`, `warn` and `fatal`.
impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace"                => Ok(Self::Trace),
            "debug"                => Ok(Self::Debug),
            "information" | "info" => Ok(Self::Information),
            "warning" | "warn"     => Ok(Self::Warning),
            "error"                => Ok(Self::Error),
            "critical" | "fatal"   => Ok(Self::Critical),
            _                      => Err(ParseSeverityError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ParseSeverityError;

    fn try_from(s: String) -> Result<Self, ParseSeverityError> {
        s.parse()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logging backend.
///
/// Implementations must tolerate concurrent calls; any serialisation of
/// writes is theirs to do.
pub trait Logger: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    /// Emits a timing record along with its rendered message.
    ///
    /// Backends that keep structured fields override this; the default
    /// logs the message alone.
    fn log_record(&self, severity: Severity, record: &LogRecord, message: &str) {
        let _ = record;
        self.log(severity, message);
    }
}

// One arm per level: `tracing` levels must be known at the callsite.
macro_rules! emit {
    ($severity:expr, $($arg:tt)+) => {
        match $severity {
            Severity::Trace       => tracing::trace!(target: "performance", $($arg)+),
            Severity::Debug       => tracing::debug!(target: "performance", $($arg)+),
            Severity::Information => tracing::info!(target: "performance", $($arg)+),
            Severity::Warning     => tracing::warn!(target: "performance", $($arg)+),
            Severity::Error       => tracing::error!(target: "performance", $($arg)+),
            Severity::Critical    => tracing::error!(target: "performance", critical = true, $($arg)+),
        }
    };
}

/// Forwards to the `tracing` macros under the `performance` target.
///
/// `tracing` has no level above `ERROR`, so [`Severity::Critical`] is
/// emitted at `ERROR` with `critical = true`. Timing records carry
/// `operation`, `duration_ms` and `correlation_id` fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, severity: Severity, message: &str) {
        emit!(severity, "{}", message);
    }

    fn log_record(&self, severity: Severity, record: &LogRecord, message: &str) {
        emit!(
            severity,
            operation = %record.operation,
            duration_ms = record.duration_ms,
            correlation_id = %record.correlation_id,
            "{}",
            message
        );
    }
}
