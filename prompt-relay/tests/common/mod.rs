#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use prompt_relay::services::TextProvider;
use prompt_relay::startup::{build_router, AppState, Application};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

/// Response captured from a one-shot request against the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub raw: String,
    pub json: serde_json::Value,
}

pub fn router_with(provider: Arc<dyn TextProvider>) -> Router {
    build_router(AppState::new(provider))
}

pub async fn send(router: Router, method: Method, uri: &str) -> TestResponse {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let raw = String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8");
    let json = serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null);

    TestResponse {
        status,
        headers,
        raw,
        json,
    }
}

pub async fn get(router: Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri).await
}

/// Exactly one of `response`/`error` is non-null and `success` tracks `response`.
pub fn assert_envelope_exclusive(body: &serde_json::Value) {
    let has_response = !body["response"].is_null();
    let has_error = !body["error"].is_null();
    assert!(has_response ^ has_error, "envelope not exclusive: {}", body);
    assert_eq!(body["success"].as_bool(), Some(has_response));
}

/// Spawn the application on a random port and return the port number.
pub async fn spawn_app(provider: Arc<dyn TextProvider>) -> u16 {
    let app = Application::build_with_provider(0, provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to be ready by polling health endpoint
    let client = reqwest::Client::new();
    let health_url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    port
}
