//! Gateway response representation.
//!
//! # Responsibilities
//! - Status, headers and a fully buffered body
//! - Constructors for the responses handlers and stages produce
//! - Conversion to and from wire-level `http::Response<Bytes>`
//!
//! # Design Decisions
//! - Internal failures always render the same fixed body; details stay in logs
//! - Redirects are plain 3xx responses with `Location`; bridging them for the
//!   client is the pipeline's job, not the handler's

use axum::http::header::{self, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use bytes::Bytes;
use serde::Serialize;

/// Body used for every 500 the gateway produces.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// A response travelling back out through the pipeline.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    route: Option<String>,
}

impl GatewayResponse {
    /// An empty-bodied response with the given status.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            route: None,
        }
    }

    pub fn no_content() -> Self {
        Self::empty(StatusCode::NO_CONTENT)
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::empty(status)
            .with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            )
            .with_body(Bytes::from(body.into()))
    }

    /// Serialize `value` as a JSON response.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::empty(status)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(Bytes::from(body)))
    }

    /// A `302 Found` redirect to `location`.
    pub fn redirect(location: &str) -> Result<Self, InvalidHeaderValue> {
        Self::redirect_with(StatusCode::FOUND, location)
    }

    pub fn redirect_with(status: StatusCode, location: &str) -> Result<Self, InvalidHeaderValue> {
        let location = HeaderValue::from_str(location)?;
        Ok(Self::empty(status).with_header(header::LOCATION, location))
    }

    pub fn not_found() -> Self {
        Self::text(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn bad_request() -> Self {
        Self::text(StatusCode::BAD_REQUEST, "Bad Request")
    }

    pub fn internal_error() -> Self {
        Self::text(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Target of a redirect response, if any.
    pub fn location(&self) -> Option<&HeaderValue> {
        self.headers.get(header::LOCATION)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Key of the route that produced this response, `None` when no route
    /// matched. Never sent on the wire.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn with_route(mut self, key: impl Into<String>) -> Self {
        self.route = Some(key.into());
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set a header, replacing existing values.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    pub fn into_http(self) -> Response<Bytes> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }

    pub fn from_http(response: Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
            route: None,
        }
    }
}
