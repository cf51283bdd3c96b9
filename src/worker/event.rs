//! Events delivered to the worker and their outcomes.

use axum::http::{Request, Response};
use bytes::Bytes;
use tokio::sync::watch;

/// Requests cancellation of the fetch it was paired with.
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the signal. Idempotent.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes an `AbortController`.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal fires; pending forever if it cannot.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|aborted| *aborted).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::never()
    }
}

/// One intercepted network request.
#[derive(Debug)]
pub struct FetchEvent {
    pub request: Request<Bytes>,
    pub signal: AbortSignal,
}

impl FetchEvent {
    pub fn new(request: Request<Bytes>) -> Self {
        Self {
            request,
            signal: AbortSignal::never(),
        }
    }

    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = signal;
        self
    }
}

/// What the worker did with a fetch event.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not claimed; the request proceeds to the network unchanged.
    Fallthrough(Request<Bytes>),
    Respond(Response<Bytes>),
    /// The initiator aborted before a response was produced.
    Aborted,
}

impl FetchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Fallthrough(_) => "fallthrough",
            FetchOutcome::Respond(_) => "respond",
            FetchOutcome::Aborted => "aborted",
        }
    }
}

/// Events a worker global receives.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchEvent),
}
