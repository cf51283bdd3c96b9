//! Typed client subsystem.
//!
//! # Data Flow
//! ```text
//! RouteDefinition (shared with the server)
//!     → RouteClient::prepare (href from params, body encoding, method)
//!     → Fetch (HttpFetch over the network, WorkerFetch in-process)
//!     → interpret (redirect header → Navigate, status, empty, JSON, text)
//! ```
//!
//! # Design Decisions
//! - Redirect detection runs before the status check
//! - Path parameters are checked before any transport activity
//! - `ANY` routes are sent as GET unless the caller picks a method

pub mod error;
pub mod form_action;
pub mod options;
pub mod resource;
pub mod transport;

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Request, Response};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::{ClientConfig, ProtocolConfig};
use crate::navigation::NavigationSignal;
use crate::routing::{RouteDefinition, RouteParams, RouteRegistry};

pub use error::ClientError;
pub use form_action::{FormAction, Submission};
pub use options::{RequestPayload, SendOptions};
pub use resource::Resource;
pub use transport::{Fetch, HttpFetch, TransportError, WorkerFetch};

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    /// Deserialize a JSON payload into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Payload::Json(value) => T::deserialize(value),
            Payload::Text(text) => serde_json::from_str(text),
        }
    }
}

struct ClientInner {
    registry: Arc<RouteRegistry>,
    transport: Arc<dyn Fetch>,
    base_url: Url,
    override_field: String,
    redirect_header: HeaderName,
}

/// Client-side view of a route registry.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        registry: Arc<RouteRegistry>,
        transport: Arc<dyn Fetch>,
        client: &ClientConfig,
        protocol: &ProtocolConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                registry,
                transport,
                base_url: client.base_url.clone(),
                override_field: protocol.method_override_field.clone(),
                redirect_header: protocol.redirect_header.clone(),
            }),
        }
    }

    pub fn route(&self, route: &Arc<RouteDefinition>) -> RouteClient {
        RouteClient {
            client: self.clone(),
            route: Arc::clone(route),
        }
    }

    /// Client for the route with key `pattern:METHOD`.
    pub fn by_key(&self, key: &str) -> Option<RouteClient> {
        self.inner.registry.get(key).map(|route| self.route(route))
    }

    /// Client for a named route such as `todos.show`.
    pub fn by_name(&self, name: &str) -> Option<RouteClient> {
        self.inner.registry.by_name(name).map(|route| self.route(route))
    }

    /// One client per route, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = RouteClient> + '_ {
        self.inner.registry.iter().map(|route| self.route(route))
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.inner.registry
    }

    pub(crate) fn override_field(&self) -> &str {
        &self.inner.override_field
    }
}

/// Calls one route.
#[derive(Clone)]
pub struct RouteClient {
    client: ApiClient,
    route: Arc<RouteDefinition>,
}

impl RouteClient {
    pub fn key(&self) -> &str {
        self.route.key()
    }

    pub fn route(&self) -> &Arc<RouteDefinition> {
        &self.route
    }

    /// Path plus query for the given values.
    pub fn href(&self, params: &RouteParams, query: &[(String, String)]) -> Result<String, ClientError> {
        Ok(self.route.pattern().href(params, query)?)
    }

    /// Build the outgoing request without sending it.
    pub fn prepare(&self, options: SendOptions) -> Result<Request<Bytes>, ClientError> {
        let href = self.href(&options.params, &options.query)?;
        let url = self
            .client
            .inner
            .base_url
            .join(&href)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let method = options
            .method
            .unwrap_or_else(|| self.route.method().transport_method());

        let (content_type, body) = match options.payload {
            RequestPayload::None => (None, Bytes::new()),
            RequestPayload::Form(form) => {
                let boundary = format!("----WorkerGatewayBoundary{}", Uuid::new_v4().simple());
                let content_type = format!("multipart/form-data; boundary={boundary}");
                (Some(content_type), form.to_multipart(&boundary))
            }
            RequestPayload::UrlEncoded(body) => (
                Some("application/x-www-form-urlencoded".to_string()),
                Bytes::from(body),
            ),
            RequestPayload::Json(value) => (
                Some("application/json".to_string()),
                Bytes::from(serde_json::to_vec(&value)?),
            ),
        };

        let mut request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let headers = request.headers_mut();
        headers.extend(options.headers);
        if let Some(content_type) = content_type {
            let value = HeaderValue::from_str(&content_type)
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
            headers.insert(header::CONTENT_TYPE, value);
        }
        Ok(request)
    }

    /// Send a request for this route and decode the response.
    ///
    /// `Ok(None)` means the server answered with an empty body.
    pub async fn send(&self, options: SendOptions) -> Result<Option<Payload>, ClientError> {
        let request = self.prepare(options)?;
        tracing::debug!(route = %self.key(), method = %request.method(), uri = %request.uri(), "Sending request");
        let response = self.client.inner.transport.fetch(request).await?;
        self.interpret(response)
    }

    fn interpret(&self, response: Response<Bytes>) -> Result<Option<Payload>, ClientError> {
        let target = response
            .headers()
            .get(&self.client.inner.redirect_header)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).trim().to_string())
            .filter(|target| !target.is_empty());
        if let Some(target) = target {
            tracing::debug!(route = %self.key(), target = %target, "Redirect received");
            return Err(ClientError::Navigate(NavigationSignal::new(target)));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.into_body();
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(match serde_json::from_slice(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(String::from_utf8_lossy(&body).into_owned()),
        }))
    }
}
