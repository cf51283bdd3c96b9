//! Route definitions and the registry that owns them.
//!
//! # Responsibilities
//! - Store every compiled route, keyed by `pattern:METHOD` and optional name
//! - Reject duplicate keys and names when the registry is built
//! - Resolve a logical method + path to a route and its parameters
//!
//! # Design Decisions
//! - Immutable after `build()`; shared by `Arc` between dispatch and clients
//! - Exact-method routes take precedence over `ANY` routes
//! - Among equals, registration order wins
//! - Explicit `None` on no match rather than a silent default

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::{Handler, RouteError, RouteMethod, RouteParams, RoutePattern};

/// One endpoint: method, pattern and, on the serving side, a handler.
pub struct RouteDefinition {
    name: Option<String>,
    method: RouteMethod,
    pattern: RoutePattern,
    handler: Option<Arc<dyn Handler>>,
    key: String,
}

impl RouteDefinition {
    pub fn new(method: RouteMethod, pattern: RoutePattern) -> Self {
        let key = format!("{}:{}", pattern, method);
        Self {
            name: None,
            method,
            pattern,
            handler: None,
            key,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Unique key: `pattern:METHOD`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> Option<&Arc<dyn Handler>> {
        self.handler.as_ref()
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteDefinition>,
    pub params: RouteParams,
}

/// Immutable collection of routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<Arc<RouteDefinition>>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl RouteRegistry {
    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&Arc<RouteDefinition>> {
        self.by_key.get(key).map(|&i| &self.routes[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<RouteDefinition>> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the route serving `method` + `path`.
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let mut fallback = None;
        for route in &self.routes {
            if !route.method.matches(method) {
                continue;
            }
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            let matched = RouteMatch {
                route: Arc::clone(route),
                params,
            };
            if !route.method.is_any() {
                return Some(matched);
            }
            fallback.get_or_insert(matched);
        }
        fallback
    }
}

struct PendingRoute {
    name: Option<String>,
    method: String,
    pattern: String,
    handler: Option<Arc<dyn Handler>>,
}

/// Collects route declarations; all validation happens in [`build`](Self::build).
#[derive(Default)]
pub struct RouteRegistryBuilder {
    pending: Vec<PendingRoute>,
}

impl RouteRegistryBuilder {
    /// Declare a route served by `handler`.
    pub fn route<H: Handler + 'static>(self, method: &str, pattern: &str, handler: H) -> Self {
        self.push(None, method, pattern, Some(Arc::new(handler)))
    }

    /// Declare a named route served by `handler`.
    pub fn named_route<H: Handler + 'static>(
        self,
        name: &str,
        method: &str,
        pattern: &str,
        handler: H,
    ) -> Self {
        self.push(Some(name), method, pattern, Some(Arc::new(handler)))
    }

    /// Declare a route without a handler (client-side description only).
    pub fn client_route(self, method: &str, pattern: &str) -> Self {
        self.push(None, method, pattern, None)
    }

    pub fn named_client_route(self, name: &str, method: &str, pattern: &str) -> Self {
        self.push(Some(name), method, pattern, None)
    }

    pub fn get<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("GET", pattern, handler)
    }

    pub fn post<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("POST", pattern, handler)
    }

    pub fn put<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("PUT", pattern, handler)
    }

    pub fn patch<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("PATCH", pattern, handler)
    }

    pub fn delete<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("DELETE", pattern, handler)
    }

    pub fn any<H: Handler + 'static>(self, pattern: &str, handler: H) -> Self {
        self.route("ANY", pattern, handler)
    }

    fn push(
        mut self,
        name: Option<&str>,
        method: &str,
        pattern: &str,
        handler: Option<Arc<dyn Handler>>,
    ) -> Self {
        self.pending.push(PendingRoute {
            name: name.map(str::to_owned),
            method: method.to_string(),
            pattern: pattern.to_string(),
            handler,
        });
        self
    }

    /// Compile every declaration. Fails on the first malformed pattern,
    /// unsupported method, duplicate key or duplicate name.
    pub fn build(self) -> Result<RouteRegistry, RouteError> {
        let mut registry = RouteRegistry::default();

        for pending in self.pending {
            let method = RouteMethod::parse(&pending.method)?;
            let pattern = RoutePattern::parse(&pending.pattern)?;

            let mut definition = RouteDefinition::new(method, pattern);
            if let Some(name) = pending.name {
                definition = definition.with_name(name);
            }
            if let Some(handler) = pending.handler {
                definition = definition.with_handler(handler);
            }

            let index = registry.routes.len();
            if registry.by_key.contains_key(definition.key()) {
                return Err(RouteError::DuplicateRoute(definition.key().to_string()));
            }
            if let Some(name) = definition.name() {
                if registry.by_name.insert(name.to_string(), index).is_some() {
                    return Err(RouteError::DuplicateRoute(name.to_string()));
                }
            }
            registry.by_key.insert(definition.key().to_string(), index);

            tracing::debug!(key = %definition.key(), name = ?definition.name(), "Route registered");
            registry.routes.push(Arc::new(definition));
        }

        tracing::info!(routes = registry.len(), "Route registry built");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::GatewayResponse;
    use crate::routing::{params, HandlerResult, RequestContext};

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok(GatewayResponse::no_content())
    }

    #[test]
    fn test_duplicate_method_and_pattern_fails() {
        let err = RouteRegistry::builder()
            .get("/api/todos", ok)
            .get("/api/todos", ok)
            .build()
            .unwrap_err();
        assert_eq!(err, RouteError::DuplicateRoute("/api/todos:GET".into()));
    }

    #[test]
    fn test_same_pattern_different_methods_succeeds() {
        let registry = RouteRegistry::builder()
            .get("/api/todos/:id", ok)
            .delete("/api/todos/:id", ok)
            .any("/api/todos/:id", ok)
            .build()
            .unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.get("/api/todos/:id:DELETE").is_some());
        assert!(registry.get("/api/todos/:id:ANY").is_some());
    }

    #[test]
    fn test_duplicate_name_fails() {
        let err = RouteRegistry::builder()
            .named_client_route("todos", "GET", "/api/todos")
            .named_client_route("todos", "POST", "/api/todos")
            .build()
            .unwrap_err();
        assert_eq!(err, RouteError::DuplicateRoute("todos".into()));
    }

    #[test]
    fn test_registration_errors_surface_at_build() {
        assert!(matches!(
            RouteRegistry::builder().client_route("TRACE", "/x").build(),
            Err(RouteError::UnsupportedMethod(_))
        ));
        assert!(matches!(
            RouteRegistry::builder().client_route("GET", "x").build(),
            Err(RouteError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_resolve_prefers_exact_method_over_any() {
        let registry = RouteRegistry::builder()
            .any("/api/todos/:id", ok)
            .delete("/api/todos/:id", ok)
            .build()
            .unwrap();

        let matched = registry.resolve(&Method::DELETE, "/api/todos/9").unwrap();
        assert_eq!(matched.route.key(), "/api/todos/:id:DELETE");
        assert_eq!(matched.params, params([("id", "9")]));

        let matched = registry.resolve(&Method::PUT, "/api/todos/9").unwrap();
        assert_eq!(matched.route.key(), "/api/todos/:id:ANY");

        assert!(registry.resolve(&Method::GET, "/api/other").is_none());
    }

    #[test]
    fn test_resolve_respects_method() {
        let registry = RouteRegistry::builder()
            .post("/api/todos", ok)
            .build()
            .unwrap();
        assert!(registry.resolve(&Method::GET, "/api/todos").is_none());
        assert!(registry.resolve(&Method::POST, "/api/todos").is_some());
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = RouteRegistry::builder()
            .named_route("todos.show", "GET", "/api/todos/:id", ok)
            .build()
            .unwrap();
        let route = registry.by_name("todos.show").unwrap();
        assert_eq!(route.key(), "/api/todos/:id:GET");
        assert!(route.handler().is_some());
    }
}
