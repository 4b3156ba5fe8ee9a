//! Client-supplied correlation identifiers.

use async_trait::async_trait;
use tracing::trace;

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

use super::{Middleware, Next};

/// Adopts the correlation identifier a client sent in a request header.
///
/// Every request already has an identifier assigned by the server. When the
/// configured header is present and non-blank its value replaces that
/// identifier, so downstream log lines line up with the caller's. Register
/// it before [`TimingLog`](super::TimingLog).
#[derive(Clone, Debug)]
pub struct CorrelationId {
    header: String,
}

impl CorrelationId {
    pub const DEFAULT_HEADER: &'static str = "x-correlation-id";

    pub fn header(name: &str) -> Self {
        Self { header: name.to_owned() }
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::header(Self::DEFAULT_HEADER)
    }
}

#[async_trait]
impl Middleware for CorrelationId {
    async fn handle(&self, mut req: Request, next: Next) -> Result<Response, Error> {
        let supplied = req.header(&self.header)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);

        if let Some(id) = supplied {
            trace!(header = %self.header, correlation_id = %id, "adopting client correlation id");
            req.set_correlation_id(id);
        }

        next.run(req).await
    }
}
