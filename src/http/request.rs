//! Gateway request representation.
//!
//! # Responsibilities
//! - Carry method, URI, headers and body through the pipeline
//! - Keep the logical (routing) method separate from the transport method
//! - Expose parsed bodies (form fields, JSON) to handlers
//!
//! # Design Decisions
//! - Stages take the request by value and hand it on; changes are made
//!   through consuming `with_*` derivations, never through shared mutation
//! - Headers use `HeaderMap`: insertion ordered, case-insensitive names

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use bytes::Bytes;
use serde_json::Value;

use crate::http::form::FormData;

/// Request body in its raw or normalized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Raw(Bytes),
    Form(FormData),
    Json(Value),
}

/// A request travelling through the gateway pipeline.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: Method,
    transport_method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: RequestBody,
}

impl GatewayRequest {
    /// Create a body-less request.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            transport_method: method.clone(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Build from a wire-level request. The body stays raw until normalized.
    pub fn from_http(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            transport_method: parts.method.clone(),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body: if body.is_empty() {
                RequestBody::Empty
            } else {
                RequestBody::Raw(body)
            },
        }
    }

    /// Logical method used for route matching.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Method the request was physically delivered with.
    pub fn transport_method(&self) -> &Method {
        &self.transport_method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Decoded query string pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Media type of the body without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.header(header::CONTENT_TYPE).map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn into_body(self) -> RequestBody {
        self.body
    }

    /// Parsed form fields, when the body was a form submission.
    pub fn form(&self) -> Option<&FormData> {
        match &self.body {
            RequestBody::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Parsed JSON document, when the body was declared as JSON.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Derive a request with a different logical method.
    ///
    /// The transport method is left untouched.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}
