//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     declarations (method, pattern, handler?)
//!     → pattern.rs (compile `:name` / `*rest` templates)
//!     → registry.rs (reject duplicates, freeze as immutable registry)
//!
//! Server side:
//!     logical method + path → registry.rs resolve → RouteMatch or None
//!
//! Client side:
//!     RouteDefinition + params → pattern.rs build → concrete href
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Registration conflicts are fatal, never shadowed

pub mod handler;
pub mod method;
pub mod pattern;
pub mod registry;

use thiserror::Error;

pub use handler::{BoxError, Handler, HandlerResult, RequestContext};
pub use method::RouteMethod;
pub use pattern::{params, RouteParams, RoutePattern};
pub use registry::{RouteDefinition, RouteMatch, RouteRegistry, RouteRegistryBuilder};

/// Registration and path-building errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unsupported route method `{0}`")]
    UnsupportedMethod(String),

    #[error("duplicate route `{0}`")]
    DuplicateRoute(String),

    #[error("missing path parameter `{param}` for `{pattern}`")]
    MissingParam { pattern: String, param: String },

    #[error("path parameter `{param}` for `{pattern}` may not be `.` or `..`")]
    InvalidParam { pattern: String, param: String },
}
