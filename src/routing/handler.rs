//! Route handlers and the context they receive.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::{FormData, GatewayRequest, GatewayResponse};
use crate::routing::{RouteDefinition, RouteParams};

/// Error type handlers may fail with. Never shown to the client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<GatewayResponse, BoxError>;

/// Server-side endpoint logic bound to a route.
///
/// Implemented for every `Fn(RequestContext) -> impl Future<Output = HandlerResult>`.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(ctx))
    }
}

/// Everything a handler gets for one matched request.
#[derive(Debug)]
pub struct RequestContext {
    request: GatewayRequest,
    params: RouteParams,
    route: Arc<RouteDefinition>,
}

impl RequestContext {
    pub fn new(request: GatewayRequest, params: RouteParams, route: Arc<RouteDefinition>) -> Self {
        Self {
            request,
            params,
            route,
        }
    }

    pub fn request(&self) -> &GatewayRequest {
        &self.request
    }

    pub fn into_request(self) -> GatewayRequest {
        self.request
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// A captured path parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn route(&self) -> &Arc<RouteDefinition> {
        &self.route
    }

    pub fn form(&self) -> Option<&FormData> {
        self.request.form()
    }

    /// Deserialize the JSON body, if the request carried one.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.request
            .json()
            .map(|value| serde_json::from_value(value.clone()))
    }
}
