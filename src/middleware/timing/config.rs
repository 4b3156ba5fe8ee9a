//! Configuration for [`TimingLog`](super::TimingLog).

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::log::Severity;

use super::record::{LogRecord, render_template};

/// Template used when nothing else is configured.
pub const DEFAULT_TEMPLATE: &str = "request to {operation} took {duration}ms";

type FormatterFn = dyn Fn(&LogRecord, Option<&(dyn StdError + 'static)>) -> String + Send + Sync;

/// How a [`LogRecord`] becomes a log message.
#[derive(Clone)]
pub enum Format {
    /// Placeholders `{operation}`, `{duration}` and `{correlationId}` are
    /// substituted by name.
    Template(String),
    /// Called with the record and the error, if any. Successful requests are
    /// the only ones logged, so the error is currently always `None`.
    Formatter(Arc<FormatterFn>),
}

impl Format {
    pub fn render(&self, record: &LogRecord) -> String {
        match self {
            Self::Template(template) => render_template(template, record),
            Self::Formatter(formatter) => formatter(record, None),
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::Template(DEFAULT_TEMPLATE.to_owned())
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Formatter(_) => f.write_str("Formatter(..)"),
        }
    }
}

/// Immutable settings of a [`TimingLog`](super::TimingLog).
///
/// ```rust
/// use lapse::Severity;
/// use lapse::middleware::TimingLogConfig;
///
/// let config = TimingLogConfig::builder()
///     .with_severity(Severity::Debug)
///     .with_format("{operation} => {duration}")
///     .build()
///     .unwrap();
/// assert_eq!(config.severity(), Severity::Debug);
/// ```
#[derive(Clone, Debug)]
pub struct TimingLogConfig {
    severity: Severity,
    format: Format,
    duration_header: bool,
}

impl TimingLogConfig {
    /// An empty builder: severity `Information`, no format chosen yet.
    pub fn builder() -> TimingLogBuilder {
        TimingLogBuilder { severity: Severity::default(), format: None, duration_header: false }
    }

    /// A builder seeded with this configuration.
    pub fn to_builder(&self) -> TimingLogBuilder {
        TimingLogBuilder {
            severity: self.severity,
            format: Some(self.format.clone()),
            duration_header: self.duration_header,
        }
    }

    pub fn severity(&self) -> Severity { self.severity }
    pub fn format(&self) -> &Format { &self.format }

    /// Whether responses carry an `x-request-duration` header.
    pub fn duration_header(&self) -> bool { self.duration_header }
}

/// `Information`, [`DEFAULT_TEMPLATE`], no duration header.
impl Default for TimingLogConfig {
    fn default() -> Self {
        Self { severity: Severity::default(), format: Format::default(), duration_header: false }
    }
}

/// Fluent builder for [`TimingLogConfig`].
///
/// Every setter overwrites; the last call for a field wins.
/// [`with_format`](Self::with_format) and
/// [`with_formatter`](Self::with_formatter) replace one another.
#[derive(Clone, Debug)]
#[must_use]
pub struct TimingLogBuilder {
    severity: Severity,
    format: Option<Format>,
    duration_header: bool,
}

impl TimingLogBuilder {
    /// Resets severity and format to their defaults.
    pub fn defaults(mut self) -> Self {
        self.severity = Severity::default();
        self.format = Some(Format::default());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_format(mut self, template: impl Into<String>) -> Self {
        self.format = Some(Format::Template(template.into()));
        self
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&LogRecord, Option<&(dyn StdError + 'static)>) -> String + Send + Sync + 'static,
    {
        self.format = Some(Format::Formatter(Arc::new(formatter)));
        self
    }

    pub fn with_duration_header(mut self, enabled: bool) -> Self {
        self.duration_header = enabled;
        self
    }

    /// Fails if no format was chosen or the template is empty.
    pub fn build(self) -> Result<TimingLogConfig, ConfigError> {
        let format = match self.format {
            None => return Err(ConfigError::MissingFormat),
            Some(Format::Template(t)) if t.is_empty() => return Err(ConfigError::EmptyTemplate),
            Some(format) => format,
        };
        Ok(TimingLogConfig { severity: self.severity, format, duration_header: self.duration_header })
    }
}
