//! Per-call options for `RouteClient::send`.

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use serde_json::Value;

use crate::client::ClientError;
use crate::http::FormData;
use crate::routing::RouteParams;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestPayload {
    #[default]
    None,
    /// Sent as `multipart/form-data`.
    Form(FormData),
    /// Sent as-is with `application/x-www-form-urlencoded`.
    UrlEncoded(String),
    /// Sent as `application/json`.
    Json(Value),
}

#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub(crate) params: RouteParams,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) payload: RequestPayload,
    pub(crate) method: Option<Method>,
    pub(crate) headers: HeaderMap,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: RouteParams) -> Self {
        self.params.extend(params);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Serialize `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ClientError> {
        Ok(self.json_value(serde_json::to_value(value)?))
    }

    pub fn json_value(mut self, value: Value) -> Self {
        self.payload = RequestPayload::Json(value);
        self
    }

    pub fn form(mut self, form: FormData) -> Self {
        self.payload = RequestPayload::Form(form);
        self
    }

    pub fn urlencoded(mut self, body: impl Into<String>) -> Self {
        self.payload = RequestPayload::UrlEncoded(body.into());
        self
    }

    /// Send with `method` instead of the route's own.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }
}
