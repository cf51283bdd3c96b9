//! Client transports.
//!
//! # Responsibilities
//! - `Fetch`: the page's `fetch()` as an injectable trait
//! - `HttpFetch`: real network fetch through reqwest
//! - `WorkerFetch`: fetch intercepted by an in-process `ServiceWorker`
//!
//! # Design Decisions
//! - Requests and responses are fully buffered `http` types
//! - A worker fallthrough goes to the network transport when one is set

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Request, Response};
use bytes::Bytes;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::worker::{AbortSignal, FetchEvent, FetchOutcome, ServiceWorker};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request to {0} was not handled")]
    Unhandled(String),

    #[error("request aborted")]
    Aborted,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Sends one request and returns the buffered response.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}

/// Network transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let request = reqwest::Request::try_from(request)?;
        tracing::debug!(method = %request.method(), url = %request.url(), "Network fetch");

        let response = self.client.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        let mut out = Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

/// Page-side fetch routed through an in-process worker.
#[derive(Clone)]
pub struct WorkerFetch {
    worker: Arc<ServiceWorker>,
    network: Option<Arc<dyn Fetch>>,
}

impl WorkerFetch {
    pub fn new(worker: Arc<ServiceWorker>) -> Self {
        Self {
            worker,
            network: None,
        }
    }

    /// Send requests the worker does not claim to `network`.
    pub fn with_network(mut self, network: Arc<dyn Fetch>) -> Self {
        self.network = Some(network);
        self
    }

    /// Fetch with a cancellation signal attached to the event.
    pub async fn fetch_with_signal(
        &self,
        request: Request<Bytes>,
        signal: AbortSignal,
    ) -> Result<Response<Bytes>, TransportError> {
        let event = FetchEvent::new(request).with_signal(signal);
        match self.worker.handle(event).await {
            FetchOutcome::Respond(response) => Ok(response),
            FetchOutcome::Aborted => Err(TransportError::Aborted),
            FetchOutcome::Fallthrough(request) => match &self.network {
                Some(network) => network.fetch(request).await,
                None => Err(TransportError::Unhandled(request.uri().to_string())),
            },
        }
    }
}

#[async_trait]
impl Fetch for WorkerFetch {
    async fn fetch(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        self.fetch_with_signal(request, AbortSignal::never()).await
    }
}
