//! Development host.
//!
//! # Responsibilities
//! - Stand in for the browser: every incoming HTTP request becomes a
//!   `FetchEvent` for the in-process `ServiceWorker`
//! - Serve static assets for everything the worker lets fall through
//!
//! # Design Decisions
//! - Request URIs are made absolute against the configured page origin so
//!   the worker's same-origin filter sees what a browser would send
//! - Bodies are buffered up to the configured limit before interception

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::worker::{FetchEvent, FetchOutcome, ServiceWorker, WorkerHost};

/// `WorkerHost` for a single-process host: nothing to wait for or claim.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalHost;

#[async_trait]
impl WorkerHost for LocalHost {
    async fn skip_waiting(&self) {
        tracing::debug!("skip_waiting: no previous worker");
    }

    async fn claim_clients(&self) {
        tracing::debug!("claim_clients: all connections are controlled");
    }
}

#[derive(Clone)]
struct DevhostState {
    worker: Arc<ServiceWorker>,
    origin: Url,
    assets: ServeDir,
    max_body_bytes: usize,
}

/// Build the dev host router around an activated worker.
pub fn router(
    worker: Arc<ServiceWorker>,
    origin: Url,
    assets_dir: impl AsRef<Path>,
    max_body_bytes: usize,
) -> Router {
    let state = DevhostState {
        worker,
        origin,
        assets: ServeDir::new(assets_dir),
        max_body_bytes,
    };

    Router::new()
        .fallback(intercept)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn intercept(State(state): State<DevhostState>, request: Request) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "Failed to buffer request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large").into_response();
        }
    };

    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let uri = match absolute_uri(&state.origin, target) {
        Some(uri) => uri,
        None => {
            tracing::warn!(target = %target, "Unresolvable request target");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };
    parts.uri = uri;

    let event = FetchEvent::new(axum::http::Request::from_parts(parts, bytes));
    match state.worker.handle(event).await {
        FetchOutcome::Respond(response) => response.map(Body::from).into_response(),
        FetchOutcome::Fallthrough(request) => {
            let (parts, bytes) = request.into_parts();
            let request = axum::http::Request::from_parts(parts, Body::from(bytes));
            match state.assets.oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
        FetchOutcome::Aborted => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

fn absolute_uri(origin: &Url, target: &str) -> Option<Uri> {
    let url = origin.join(target).ok()?;
    url.as_str().parse().ok()
}

/// Wait for Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
