//! Terminal stage: route resolution and handler invocation.
//!
//! # Responsibilities
//! - Resolve logical method + path against the registry
//! - Invoke the matched handler with a `RequestContext`
//! - Turn misses, missing handlers, errors and panics into fixed responses
//!
//! # Design Decisions
//! - Handler failure detail goes to `tracing::error!`, never to the client
//! - Panics are contained to the request that caused them
//! - Every response for a matched route carries its route key; misses do not

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::http::StatusCode;
use futures_util::FutureExt;

use crate::http::{GatewayRequest, GatewayResponse};
use crate::routing::{RequestContext, RouteRegistry};

/// Innermost stage of every gateway.
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<RouteRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    pub async fn dispatch(&self, request: GatewayRequest) -> GatewayResponse {
        let Some(matched) = self.registry.resolve(request.method(), request.path()) else {
            tracing::debug!(method = %request.method(), path = %request.path(), "No route matched");
            return GatewayResponse::not_found();
        };

        let route = Arc::clone(&matched.route);
        let Some(handler) = route.handler().cloned() else {
            tracing::warn!(route = %route.key(), "Route has no handler");
            return GatewayResponse::text(StatusCode::NOT_IMPLEMENTED, "Not Implemented")
                .with_route(route.key());
        };

        tracing::debug!(route = %route.key(), params = ?matched.params, "Dispatching");

        let ctx = RequestContext::new(request, matched.params, matched.route);
        let outcome = AssertUnwindSafe(async move { handler.call(ctx).await })
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(route = %route.key(), error = %error, "Handler failed");
                GatewayResponse::internal_error()
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                tracing::error!(route = %route.key(), panic = %message, "Handler panicked");
                GatewayResponse::internal_error()
            }
        };
        response.with_route(route.key())
    }
}
