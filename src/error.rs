//! Unified error type.

use thiserror::Error as ThisError;

/// A boxed error from user middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by lapse's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures and failures raised by middleware while a request
/// travels down the stack. Middleware that sees an `Err` from
/// [`Next::run`](crate::middleware::Next::run) hands it back unchanged unless
/// it has a reason to do otherwise.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The request body could not be read from the connection.
    #[error("body: {0}")]
    Body(#[from] hyper::Error),

    /// A middleware configuration was rejected at build time.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// A middleware failed while handling a request.
    #[error("middleware: {0}")]
    Middleware(#[source] BoxError),
}

impl Error {
    /// Wraps any error raised inside a middleware.
    pub fn middleware(err: impl Into<BoxError>) -> Self {
        Self::Middleware(err.into())
    }
}

/// Rejected middleware configuration.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("timing log needs a format template or a formatter")]
    MissingFormat,

    #[error("timing log format template is empty")]
    EmptyTemplate,
}
