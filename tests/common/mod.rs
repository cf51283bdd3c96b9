//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{Request, Response};
use bytes::Bytes;

use worker_gateway::client::{ApiClient, Fetch, TransportError, WorkerFetch};
use worker_gateway::config::GatewayConfig;
use worker_gateway::demo::{self, TodoStore};
use worker_gateway::navigation::Navigator;
use worker_gateway::pipeline::Gateway;
use worker_gateway::routing::RouteRegistry;
use worker_gateway::worker::{ServiceWorker, WorkerHost};

pub const ORIGIN: &str = "http://localhost:8080";

/// Records every navigation it is asked to perform.
#[derive(Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().unwrap().push(target.to_string());
    }
}

/// Counts takeover calls.
#[derive(Default)]
pub struct TestHost {
    pub skipped: AtomicUsize,
    pub claimed: AtomicUsize,
}

#[async_trait]
impl WorkerHost for TestHost {
    async fn skip_waiting(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    async fn claim_clients(&self) {
        self.claimed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Network stand-in: counts calls and answers 200 "from network".
#[derive(Default)]
pub struct CountingFetch {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Fetch for CountingFetch {
    async fn fetch(&self, _request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(Bytes::from_static(b"from network")))
    }
}

/// Default config with request logging on.
pub fn config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.observability.request_logging = true;
    config
}

/// A worker that has been installed and activated.
pub async fn activated_worker(registry: Arc<RouteRegistry>) -> Arc<ServiceWorker> {
    let config = config();
    let gateway = Arc::new(Gateway::standard(registry, &config));
    let worker = Arc::new(ServiceWorker::new(
        gateway,
        &config.worker,
        Arc::new(TestHost::default()),
    ));
    worker.install().await;
    worker.activate().await;
    worker
}

/// A client whose fetches go through `worker`.
pub fn client_for(worker: Arc<ServiceWorker>) -> ApiClient {
    let config = config();
    let registry = Arc::clone(worker.gateway().registry());
    ApiClient::new(
        registry,
        Arc::new(WorkerFetch::new(worker)),
        &config.client,
        &config.protocol,
    )
}

/// The demo todo API wired end to end.
pub struct Demo {
    pub store: Arc<TodoStore>,
    pub worker: Arc<ServiceWorker>,
    pub client: ApiClient,
    pub navigator: Arc<RecordingNavigator>,
}

pub async fn demo() -> Demo {
    let store = Arc::new(TodoStore::new());
    let registry = Arc::new(demo::registry(Arc::clone(&store)).unwrap());
    let worker = activated_worker(registry).await;
    let client = client_for(Arc::clone(&worker));
    Demo {
        store,
        worker,
        client,
        navigator: Arc::new(RecordingNavigator::default()),
    }
}

/// A GET request for `path` on the page origin.
pub fn get(path: &str) -> Request<Bytes> {
    Request::get(format!("{ORIGIN}{path}"))
        .body(Bytes::new())
        .unwrap()
}
