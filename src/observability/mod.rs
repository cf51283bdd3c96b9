//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline, worker and dev host produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and histograms via metrics)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
