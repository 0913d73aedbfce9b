use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use fleetme_api::{app, state::AppState};
use fleetme_store::SqliteFleetStore;
use serde_json::Value;
use tower::ServiceExt;

pub async fn create_test_app() -> Router {
    let store = SqliteFleetStore::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    store.migrate().await.expect("Failed to create schema");

    app(Arc::new(AppState { store }))
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Posts url-encoded `fields`, repeating keys as given.
pub async fn post_form(app: &Router, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
    let body = serde_urlencoded::to_string(fields).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}
