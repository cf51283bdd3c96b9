//! In-memory todo API served by the dev host.
//!
//! Mutations answer with redirects so the redirect bridge and client-side
//! navigation can be exercised end to end. Data lives only in memory.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::http::GatewayResponse;
use crate::routing::{HandlerResult, RequestContext, RouteError, RouteRegistry};

/// Where the todo screens live on the client side.
pub const TODOS_PAGE: &str = "/todos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub done: bool,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: u64,
    todos: BTreeMap<u64, Todo>,
}

/// Shared todo storage.
#[derive(Debug, Default)]
pub struct TodoStore {
    inner: RwLock<StoreInner>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Todo> {
        self.inner.read().await.todos.values().cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Option<Todo> {
        self.inner.read().await.todos.get(&id).cloned()
    }

    pub async fn create(&self, title: String) -> Todo {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let todo = Todo {
            id: inner.next_id,
            title,
            done: false,
        };
        inner.todos.insert(todo.id, todo.clone());
        todo
    }

    pub async fn update(&self, id: u64, title: Option<String>, done: Option<bool>) -> Option<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.todos.get_mut(&id)?;
        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(done) = done {
            todo.done = done;
        }
        Some(todo.clone())
    }

    pub async fn remove(&self, id: u64) -> Option<Todo> {
        self.inner.write().await.todos.remove(&id)
    }
}

/// The demo route table, handlers bound to `store`.
pub fn registry(store: Arc<TodoStore>) -> Result<RouteRegistry, RouteError> {
    let index_store = Arc::clone(&store);
    let create_store = Arc::clone(&store);
    let show_store = Arc::clone(&store);
    let update_store = Arc::clone(&store);
    let destroy_store = store;

    RouteRegistry::builder()
        .named_route("health", "ANY", "/api/health", health)
        .named_route("todos.index", "GET", "/api/todos", move |ctx: RequestContext| {
            index(Arc::clone(&index_store), ctx)
        })
        .named_route("todos.create", "POST", "/api/todos", move |ctx: RequestContext| {
            create(Arc::clone(&create_store), ctx)
        })
        .named_route("todos.show", "GET", "/api/todos/:id", move |ctx: RequestContext| {
            show(Arc::clone(&show_store), ctx)
        })
        .named_route("todos.update", "PATCH", "/api/todos/:id", move |ctx: RequestContext| {
            update(Arc::clone(&update_store), ctx)
        })
        .named_route("todos.destroy", "DELETE", "/api/todos/:id", move |ctx: RequestContext| {
            destroy(Arc::clone(&destroy_store), ctx)
        })
        .build()
}

async fn health(ctx: RequestContext) -> HandlerResult {
    let body = serde_json::json!({
        "status": "ok",
        "method": ctx.request().method().as_str(),
    });
    Ok(GatewayResponse::json(StatusCode::OK, &body)?)
}

async fn index(store: Arc<TodoStore>, ctx: RequestContext) -> HandlerResult {
    let done = ctx
        .request()
        .query_pairs()
        .into_iter()
        .find(|(name, _)| name == "done")
        .map(|(_, value)| parse_flag(&value));

    let todos: Vec<Todo> = store
        .list()
        .await
        .into_iter()
        .filter(|todo| done.map_or(true, |done| todo.done == done))
        .collect();
    Ok(GatewayResponse::json(StatusCode::OK, &todos)?)
}

async fn create(store: Arc<TodoStore>, ctx: RequestContext) -> HandlerResult {
    let Some(title) = text_input(&ctx, "title").filter(|title| !title.trim().is_empty()) else {
        return Ok(GatewayResponse::text(
            StatusCode::UNPROCESSABLE_ENTITY,
            "title is required",
        ));
    };
    let todo = store.create(title).await;
    tracing::info!(id = todo.id, "Todo created");
    Ok(GatewayResponse::redirect(TODOS_PAGE)?)
}

async fn show(store: Arc<TodoStore>, ctx: RequestContext) -> HandlerResult {
    let Some(id) = todo_id(&ctx) else {
        return Ok(GatewayResponse::not_found());
    };
    let Some(todo) = store.get(id).await else {
        return Ok(GatewayResponse::not_found());
    };
    Ok(GatewayResponse::json(StatusCode::OK, &todo)?)
}

async fn update(store: Arc<TodoStore>, ctx: RequestContext) -> HandlerResult {
    let Some(id) = todo_id(&ctx) else {
        return Ok(GatewayResponse::not_found());
    };
    let title = text_input(&ctx, "title");
    let done = flag_input(&ctx, "done");

    let Some(todo) = store.update(id, title, done).await else {
        return Ok(GatewayResponse::not_found());
    };
    if ctx.form().is_some() {
        return Ok(GatewayResponse::redirect(&format!("{}/{}", TODOS_PAGE, todo.id))?);
    }
    Ok(GatewayResponse::json(StatusCode::OK, &todo)?)
}

async fn destroy(store: Arc<TodoStore>, ctx: RequestContext) -> HandlerResult {
    let Some(id) = todo_id(&ctx) else {
        return Ok(GatewayResponse::not_found());
    };
    if store.remove(id).await.is_none() {
        return Ok(GatewayResponse::not_found());
    }
    tracing::info!(id, "Todo removed");
    Ok(GatewayResponse::redirect(TODOS_PAGE)?)
}

fn todo_id(ctx: &RequestContext) -> Option<u64> {
    ctx.param("id")?.parse().ok()
}

/// A text field from a form or JSON body.
fn text_input(ctx: &RequestContext, name: &str) -> Option<String> {
    if let Some(form) = ctx.form() {
        return form.get_text(name).map(str::to_owned);
    }
    ctx.request()
        .json()
        .and_then(|body| body.get(name))
        .and_then(|value| value.as_str())
        .map(str::to_owned)
}

/// A boolean from a form (checkbox-style) or JSON body.
fn flag_input(ctx: &RequestContext, name: &str) -> Option<bool> {
    if let Some(form) = ctx.form() {
        return form.get_text(name).map(parse_flag);
    }
    ctx.request()
        .json()
        .and_then(|body| body.get(name))
        .and_then(|value| value.as_bool())
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "true" | "on" | "1" | "yes")
}
