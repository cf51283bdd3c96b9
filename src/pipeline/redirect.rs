//! Redirect bridge, server side.
//!
//! A 3xx crossing the interception boundary would be followed transparently
//! by the page's fetch, so the page could never turn it into a client-side
//! navigation. Redirects are re-encoded as `200` with an empty body and the
//! target in the reserved redirect header.

use async_trait::async_trait;
use axum::http::{HeaderName, StatusCode};

use crate::http::{GatewayRequest, GatewayResponse};
use crate::pipeline::{Middleware, Next};

pub struct RedirectBridge {
    header: HeaderName,
}

impl RedirectBridge {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

#[async_trait]
impl Middleware for RedirectBridge {
    fn name(&self) -> &'static str {
        "redirect"
    }

    async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse {
        let path = request.path().to_string();
        bridge(&self.header, next.run(request).await, &path)
    }
}

/// Re-encode a redirection response; anything else passes through.
pub fn bridge(header: &HeaderName, response: GatewayResponse, path: &str) -> GatewayResponse {
    if !response.status().is_redirection() {
        return response;
    }

    match response.location().cloned() {
        Some(location) => {
            tracing::debug!(path = %path, status = %response.status(), location = ?location, "Bridging redirect");
            GatewayResponse::empty(StatusCode::OK).with_header(header.clone(), location)
        }
        None => {
            tracing::error!(path = %path, status = %response.status(), "Redirect response without Location");
            GatewayResponse::internal_error()
        }
    }
}
