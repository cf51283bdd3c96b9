//! Method override stage.
//!
//! HTML forms can only be sent with GET or POST. A POSTed request may name its
//! logical method in a form field (default `_method`) or a header (default
//! `X-HTTP-Method-Override`); the field wins. The field itself stays in the body.

use async_trait::async_trait;
use axum::http::{HeaderName, Method};

use crate::config::ProtocolConfig;
use crate::http::{GatewayRequest, GatewayResponse};
use crate::pipeline::{Middleware, Next};

pub struct MethodOverride {
    field: String,
    header: HeaderName,
}

impl MethodOverride {
    pub fn new(protocol: &ProtocolConfig) -> Self {
        Self {
            field: protocol.method_override_field.clone(),
            header: protocol.method_override_header.clone(),
        }
    }

    fn requested(&self, request: &GatewayRequest) -> Option<String> {
        request
            .form()
            .and_then(|form| form.get_text(&self.field))
            .or_else(|| request.header(&self.header))
            .map(|value| value.trim().to_ascii_uppercase())
    }

    fn apply(&self, request: GatewayRequest) -> GatewayRequest {
        if request.transport_method() != Method::POST {
            return request;
        }
        let Some(requested) = self.requested(&request) else {
            return request;
        };

        let method = match requested.as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "PATCH" => Method::PATCH,
            "DELETE" => Method::DELETE,
            _ => {
                tracing::warn!(path = %request.path(), method = %requested, "Ignoring unknown method override");
                return request;
            }
        };

        tracing::debug!(path = %request.path(), method = %method, "Method overridden");
        request.with_method(method)
    }
}

#[async_trait]
impl Middleware for MethodOverride {
    fn name(&self) -> &'static str {
        "method_override"
    }

    async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse {
        next.run(self.apply(request)).await
    }
}
