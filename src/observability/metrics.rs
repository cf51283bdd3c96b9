//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): handling latency
//! - `gateway_fetch_events_total` (counter): interception decisions by outcome
//!
//! # Design Decisions
//! - Recording is always safe; without an installed recorder it is a no-op
//! - Prometheus exposition is opt-in (dev host only)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one request that went through the gateway pipeline.
///
/// `route` is the matched route key, or `none` when nothing matched.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    let route = route.to_string();
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "route" => route.clone()
    )
    .increment(1);
    ::metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record an interception decision (`respond`, `fallthrough`, `aborted`).
pub fn record_fetch_event(outcome: &'static str) {
    ::metrics::counter!("gateway_fetch_events_total", "outcome" => outcome).increment(1);
}
