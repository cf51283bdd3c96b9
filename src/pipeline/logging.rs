//! Request logging stage.
//!
//! Tags each request with a fresh id, logs method, path, status and latency,
//! and records the request in the `metrics` registry. Never alters traffic.
//! The metrics `route` label is the matched route key (or `none`), so label
//! cardinality is bounded by the registry rather than by incoming paths.

use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;
use uuid::Uuid;

use crate::http::{GatewayRequest, GatewayResponse};
use crate::observability::metrics;
use crate::pipeline::{Middleware, Next};

pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse {
        let start = Instant::now();
        let request_id = Uuid::new_v4();
        let method = request.method().to_string();
        let path = request.path().to_string();

        let span = tracing::debug_span!("request", request_id = %request_id, method = %method, path = %path);
        let response = async {
            tracing::debug!("Request received");
            let response = next.run(request).await;
            tracing::info!(
                status = response.status().as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request handled"
            );
            response
        }
        .instrument(span)
        .await;

        let status = response.status().as_u16();
        metrics::record_request(&method, status, route_label(&response), start);
        response
    }
}

fn route_label(response: &GatewayResponse) -> &str {
    response.route().unwrap_or("none")
}
