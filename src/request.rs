//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::error::Error;

/// An incoming HTTP request.
///
/// Every request carries a correlation identifier from the moment it is
/// accepted. The server assigns a fresh UUID; the
/// [`CorrelationId`](crate::middleware::CorrelationId) middleware can replace
/// it with one the client sent.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) correlation_id: String,
}

impl Request {
    /// Builder for requests constructed outside the server, e.g. in tests
    /// that drive [`Router::handle`](crate::Router::handle) directly.
    pub fn builder() -> RequestBuilder {
        RequestBuilder {
            method: Method::GET,
            path: "/".to_owned(),
            headers: Vec::new(),
            body: Bytes::new(),
            correlation_id: None,
        }
    }

    pub(crate) async fn from_hyper(req: hyper::Request<hyper::body::Incoming>) -> Result<Self, Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();

        // Non-UTF-8 header values are not representable here; skip them.
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
            .collect();

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers,
            body,
            params: HashMap::new(),
            correlation_id: Uuid::new_v4().to_string(),
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The identifier tying every log line of this request together.
    ///
    /// Never empty. Stable for the lifetime of the request unless a
    /// middleware deliberately replaces it.
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// Replaces the correlation identifier. Empty values are ignored.
    pub fn set_correlation_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !id.is_empty() {
            self.correlation_id = id;
        }
    }
}

/// Fluent builder for [`Request`]. Defaults to `GET /`.
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    correlation_id: Option<String>,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_owned();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Pins the correlation identifier instead of generating one.
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.correlation_id = Some(id.to_owned()).filter(|id| !id.is_empty());
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            headers: self.headers,
            body: self.body,
            params: HashMap::new(),
            correlation_id: self.correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}
