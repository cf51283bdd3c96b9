//! Network interception subsystem.
//!
//! # Data Flow
//! ```text
//! WorkerEvent::Install  → host.skip_waiting()   → Installed
//! WorkerEvent::Activate → host.claim_clients()  → Activated
//! WorkerEvent::Fetch
//!     → filter (activated, same origin, API prefix)
//!     → Gateway::fetch, raced against the AbortSignal
//!     → FetchOutcome::{Respond, Fallthrough, Aborted}
//! ```

pub mod event;
pub mod lifecycle;

pub use event::{AbortController, AbortSignal, FetchEvent, FetchOutcome, WorkerEvent};
pub use lifecycle::{ServiceWorker, WorkerHost, WorkerState};
