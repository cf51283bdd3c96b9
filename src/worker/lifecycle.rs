//! Worker lifecycle and the interception filter.
//!
//! # States
//! ```text
//! Parsed ──install()──▶ Installed ──activate()──▶ Activated
//! ```
//!
//! # Design Decisions
//! - No fetch is served before activation; earlier events fall through
//! - Only same-origin requests under the API prefix reach the gateway
//! - Cancellation drops the dispatch future; nothing is retried

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Request;
use bytes::Bytes;
use url::{Origin, Url};

use crate::config::WorkerConfig;
use crate::observability::metrics;
use crate::pipeline::Gateway;
use crate::worker::{FetchEvent, FetchOutcome, WorkerEvent};

/// The worker global's takeover primitives.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate without waiting for older workers' pages to close.
    async fn skip_waiting(&self);

    /// Take control of every open page of the origin.
    async fn claim_clients(&self);
}

/// Lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed = 0,
    Installed = 1,
    Activated = 2,
}

impl From<u8> for WorkerState {
    fn from(val: u8) -> Self {
        match val {
            1 => WorkerState::Installed,
            2 => WorkerState::Activated,
            _ => WorkerState::Parsed,
        }
    }
}

/// Network interception adapter in front of a `Gateway`.
pub struct ServiceWorker {
    gateway: Arc<Gateway>,
    origin: Origin,
    api_prefix: String,
    host: Arc<dyn WorkerHost>,
    state: AtomicU8,
}

impl ServiceWorker {
    pub fn new(gateway: Arc<Gateway>, config: &WorkerConfig, host: Arc<dyn WorkerHost>) -> Self {
        Self {
            gateway,
            origin: config.origin.origin(),
            api_prefix: config.api_prefix.clone(),
            host,
            state: AtomicU8::new(WorkerState::Parsed as u8),
        }
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from(self.state.load(Ordering::Acquire))
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub async fn install(&self) {
        self.host.skip_waiting().await;
        self.state.store(WorkerState::Installed as u8, Ordering::Release);
        tracing::info!("Worker installed");
    }

    pub async fn activate(&self) {
        self.host.claim_clients().await;
        self.state.store(WorkerState::Activated as u8, Ordering::Release);
        tracing::info!(routes = self.gateway.registry().len(), "Worker activated");
    }

    /// Whether `url` passes the interception filter.
    pub fn claims(&self, url: &Url) -> bool {
        url.origin() == self.origin && url.path().starts_with(&self.api_prefix)
    }

    pub async fn handle(&self, event: FetchEvent) -> FetchOutcome {
        let outcome = self.decide(event).await;
        metrics::record_fetch_event(outcome.label());
        outcome
    }

    async fn decide(&self, event: FetchEvent) -> FetchOutcome {
        let FetchEvent { request, signal } = event;

        if self.state() != WorkerState::Activated {
            tracing::debug!(uri = %request.uri(), "Worker not active; falling through");
            return FetchOutcome::Fallthrough(request);
        }
        if !request_url(&request).is_some_and(|url| self.claims(&url)) {
            return FetchOutcome::Fallthrough(request);
        }
        if signal.is_aborted() {
            return FetchOutcome::Aborted;
        }

        let uri = request.uri().clone();
        tokio::select! {
            response = self.gateway.fetch(request) => FetchOutcome::Respond(response),
            _ = signal.aborted() => {
                tracing::debug!(uri = %uri, "Fetch aborted by initiator");
                FetchOutcome::Aborted
            }
        }
    }

    /// Entry point mirroring a worker global's event listeners.
    ///
    /// Lifecycle events yield `None`.
    pub async fn on_event(&self, event: WorkerEvent) -> Option<FetchOutcome> {
        match event {
            WorkerEvent::Install => {
                self.install().await;
                None
            }
            WorkerEvent::Activate => {
                self.activate().await;
                None
            }
            WorkerEvent::Fetch(event) => Some(self.handle(event).await),
        }
    }
}

fn request_url(request: &Request<Bytes>) -> Option<Url> {
    Url::parse(&request.uri().to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use axum::http::StatusCode;

    use crate::config::GatewayConfig;
    use crate::http::GatewayResponse;
    use crate::routing::{HandlerResult, RequestContext, RouteRegistry};

    #[derive(Default)]
    struct CountingHost {
        skipped: AtomicUsize,
        claimed: AtomicUsize,
    }

    #[async_trait]
    impl WorkerHost for CountingHost {
        async fn skip_waiting(&self) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        async fn claim_clients(&self) {
            self.claimed.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok(GatewayResponse::text(StatusCode::OK, "ok"))
    }

    fn worker(host: Arc<CountingHost>) -> ServiceWorker {
        let config = GatewayConfig::default();
        let registry = RouteRegistry::builder().get("/api/ok", ok).build().unwrap();
        let gateway = Gateway::standard(Arc::new(registry), &config);
        ServiceWorker::new(Arc::new(gateway), &config.worker, host)
    }

    fn fetch(uri: &str) -> FetchEvent {
        FetchEvent::new(Request::get(uri).body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn test_lifecycle_calls_host() {
        let host = Arc::new(CountingHost::default());
        let worker = worker(host.clone());
        assert_eq!(worker.state(), WorkerState::Parsed);

        worker.on_event(WorkerEvent::Install).await;
        assert_eq!(worker.state(), WorkerState::Installed);
        worker.on_event(WorkerEvent::Activate).await;
        assert_eq!(worker.state(), WorkerState::Activated);

        assert_eq!(host.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(host.claimed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_before_activation_falls_through() {
        let worker = worker(Arc::new(CountingHost::default()));
        worker.install().await;
        let outcome = worker.handle(fetch("http://localhost:8080/api/ok")).await;
        assert!(matches!(outcome, FetchOutcome::Fallthrough(_)));
    }

    #[tokio::test]
    async fn test_filter() {
        let worker = worker(Arc::new(CountingHost::default()));
        worker.install().await;
        worker.activate().await;

        for uri in [
            "http://localhost:8080/index.html",
            "http://localhost:8080/apiary",
            "http://localhost:8080/api",
            "http://example.com/api/ok",
            "https://localhost:8080/api/ok",
            "/api/ok",
        ] {
            let outcome = worker.handle(fetch(uri)).await;
            assert!(matches!(outcome, FetchOutcome::Fallthrough(_)), "{uri} should fall through");
        }

        match worker.handle(fetch("http://localhost:8080/api/ok")).await {
            FetchOutcome::Respond(response) => assert_eq!(response.status(), StatusCode::OK),
            other => panic!("expected a response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_already_aborted_event_is_not_dispatched() {
        let worker = worker(Arc::new(CountingHost::default()));
        worker.install().await;
        worker.activate().await;

        let controller = crate::worker::AbortController::new();
        controller.abort();
        let event = fetch("http://localhost:8080/api/ok").with_signal(controller.signal());
        assert!(matches!(worker.handle(event).await, FetchOutcome::Aborted));
    }
}
