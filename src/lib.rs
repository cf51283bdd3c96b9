//! In-process API gateway for an intercepting network worker.
//!
//! Route definitions are declared once and shared by both sides: the worker
//! matches intercepted requests against them and runs their handlers, the
//! client builds outgoing requests from them and turns bridged redirects into
//! navigations.

// Core subsystems
pub mod config;
pub mod http;
pub mod pipeline;
pub mod routing;
pub mod worker;

// Client side
pub mod client;
pub mod navigation;

// Cross-cutting concerns
pub mod observability;

// Development host
pub mod demo;
pub mod devhost;

pub use client::{ApiClient, ClientError, FormAction, Payload, RouteClient, SendOptions};
pub use config::GatewayConfig;
pub use http::{FormData, GatewayRequest, GatewayResponse};
pub use navigation::{NavigationSignal, Navigator};
pub use pipeline::Gateway;
pub use routing::{RouteDefinition, RouteRegistry};
pub use worker::{FetchEvent, FetchOutcome, ServiceWorker};
