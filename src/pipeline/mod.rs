//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! http::Request<Bytes>
//!     → body.rs            (normalize form / JSON bodies, enforce size limit)
//!     → method_override.rs (logical method from `_method` / header)
//!     → redirect.rs        (3xx → 200 + redirect header, on the way out)
//!     → logging.rs         (request id, timing, metrics)
//!     → dispatch.rs        (route resolution, handler invocation)
//! http::Response<Bytes>
//! ```
//!
//! # Design Decisions
//! - The first registered stage is outermost; every stage sees the response
//!   of the stages inside it
//! - A stage short-circuits by not calling `Next::run`
//! - Stages hold configuration only, never per-request state

pub mod body;
pub mod dispatch;
pub mod logging;
pub mod method_override;
pub mod redirect;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Request, Response};
use bytes::Bytes;

use crate::config::GatewayConfig;
use crate::http::{GatewayRequest, GatewayResponse};
use crate::routing::RouteRegistry;

pub use body::BodyNormalization;
pub use dispatch::Dispatcher;
pub use logging::RequestLogger;
pub use method_override::MethodOverride;
pub use redirect::RedirectBridge;

/// One pipeline stage.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse;
}

/// The rest of the chain, as seen from one stage.
pub struct Next<'a> {
    stages: &'a [Arc<dyn Middleware>],
    dispatcher: &'a Dispatcher,
}

impl<'a> Next<'a> {
    /// Run the remaining stages and the dispatcher.
    pub async fn run(self, request: GatewayRequest) -> GatewayResponse {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    dispatcher: self.dispatcher,
                };
                stage.handle(request, next).await
            }
            None => self.dispatcher.dispatch(request).await,
        }
    }
}

/// A route registry bound to a middleware chain.
pub struct Gateway {
    stages: Vec<Arc<dyn Middleware>>,
    dispatcher: Dispatcher,
}

impl Gateway {
    pub fn builder(registry: Arc<RouteRegistry>) -> GatewayBuilder {
        GatewayBuilder {
            registry,
            stages: Vec::new(),
        }
    }

    /// The standard chain: body, method override, redirect bridge and,
    /// when enabled, request logging.
    pub fn standard(registry: Arc<RouteRegistry>, config: &GatewayConfig) -> Self {
        let mut builder = Self::builder(registry)
            .layer(BodyNormalization::new(config.limits.max_body_bytes))
            .layer(MethodOverride::new(&config.protocol))
            .layer(RedirectBridge::new(config.protocol.redirect_header.clone()));
        if config.observability.request_logging {
            builder = builder.layer(RequestLogger);
        }
        builder.build()
    }

    /// Run a request through the chain.
    pub async fn handle(&self, request: GatewayRequest) -> GatewayResponse {
        Next {
            stages: &self.stages,
            dispatcher: &self.dispatcher,
        }
        .run(request)
        .await
    }

    /// Wire-level entry point.
    pub async fn fetch(&self, request: Request<Bytes>) -> Response<Bytes> {
        self.handle(GatewayRequest::from_http(request))
            .await
            .into_http()
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        self.dispatcher.registry()
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }
}

pub struct GatewayBuilder {
    registry: Arc<RouteRegistry>,
    stages: Vec<Arc<dyn Middleware>>,
}

impl GatewayBuilder {
    /// Append a stage inside the ones already added.
    pub fn layer<M: Middleware + 'static>(mut self, stage: M) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn build(self) -> Gateway {
        tracing::debug!(
            stages = ?self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            routes = self.registry.len(),
            "Gateway pipeline built"
        );
        Gateway {
            stages: self.stages,
            dispatcher: Dispatcher::new(self.registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode, Uri};
    use std::sync::Mutex;

    use crate::routing::{HandlerResult, RequestContext};

    struct Trace {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Middleware for Trace {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn handle(&self, request: GatewayRequest, next: Next<'_>) -> GatewayResponse {
            self.log.lock().unwrap().push(format!("{} in", self.label));
            let response = next.run(request).await;
            self.log.lock().unwrap().push(format!("{} out", self.label));
            response
        }
    }

    struct Reject;

    #[async_trait]
    impl Middleware for Reject {
        fn name(&self) -> &'static str {
            "reject"
        }

        async fn handle(&self, _request: GatewayRequest, _next: Next<'_>) -> GatewayResponse {
            GatewayResponse::empty(StatusCode::FORBIDDEN)
        }
    }

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok(GatewayResponse::text(StatusCode::OK, "ok"))
    }

    fn registry() -> Arc<RouteRegistry> {
        Arc::new(RouteRegistry::builder().get("/api/ok", ok).build().unwrap())
    }

    #[tokio::test]
    async fn test_first_stage_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let gateway = Gateway::builder(registry())
            .layer(Trace { label: "a", log: log.clone() })
            .layer(Trace { label: "b", log: log.clone() })
            .build();

        let response = gateway
            .handle(GatewayRequest::new(Method::GET, Uri::from_static("/api/ok")))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(gateway.stage_names(), vec!["a", "b"]);
        assert_eq!(*log.lock().unwrap(), vec!["a in", "b in", "b out", "a out"]);
    }

    #[tokio::test]
    async fn test_stage_can_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let gateway = Gateway::builder(registry())
            .layer(Reject)
            .layer(Trace { label: "inner", log: log.clone() })
            .build();

        let response = gateway
            .handle(GatewayRequest::new(Method::GET, Uri::from_static("/api/ok")))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_standard_chain_order() {
        let mut config = GatewayConfig::default();
        config.observability.request_logging = true;
        let gateway = Gateway::standard(registry(), &config);
        assert_eq!(
            gateway.stage_names(),
            vec!["body", "method_override", "redirect", "logging"]
        );

        config.observability.request_logging = false;
        let gateway = Gateway::standard(registry(), &config);
        assert_eq!(gateway.stage_names(), vec!["body", "method_override", "redirect"]);
    }
}
