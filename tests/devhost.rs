//! Dev host router: API requests go through the worker, the rest to assets.

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use worker_gateway::devhost;

fn assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/assets")
}

async fn app() -> (Router, common::Demo) {
    let demo = common::demo().await;
    let router = devhost::router(
        Arc::clone(&demo.worker),
        common::ORIGIN.parse().unwrap(),
        assets_dir(),
        64 * 1024,
    );
    (router, demo)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_api_request_is_answered_by_the_gateway() {
    let (app, demo) = app().await;
    demo.store.create("milk".into()).await;

    let response = app
        .oneshot(Request::get("/api/todos").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let todos: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(todos[0]["title"], "milk");
}

#[tokio::test]
async fn test_form_post_gets_bridged_redirect() {
    let (app, demo) = app().await;

    let response = app
        .oneshot(
            Request::post("/api/todos")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title=bread"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-redirect"], "/todos");
    assert!(response.headers().get(header::LOCATION).is_none());
    assert_eq!(demo.store.list().await[0].title, "bread");
}

#[tokio::test]
async fn test_non_api_requests_are_served_from_assets() {
    let (app, _demo) = app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("worker gateway fixture"));

    let response = app
        .oneshot(Request::get("/missing.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (app, _demo) = app().await;

    let response = app
        .oneshot(
            Request::post("/api/todos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(vec![b' '; 128 * 1024]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
