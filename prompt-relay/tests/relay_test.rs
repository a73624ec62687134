//! Relay handler tests against a mock provider.
//!
//! Run with: cargo test -p prompt-relay --test relay_test

mod common;

use axum::http::{Method, StatusCode};
use common::{assert_envelope_exclusive, get, router_with, send};
use prompt_relay::models::MISSING_PROMPT_MESSAGE;
use prompt_relay::services::providers::mock::{MockBehavior, MockTextProvider};
use prompt_relay::services::ProviderError;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn missing_prompt_returns_400_without_calling_provider() {
    let provider = Arc::new(MockTextProvider::replying("unused"));

    for uri in ["/", "/?prompt=", "/?prompt", "/?q=hello", "/anything/else"] {
        let response = get(router_with(provider.clone()), uri).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(
            response.json,
            json!({
                "success": false,
                "response": null,
                "error": MISSING_PROMPT_MESSAGE
            })
        );
        assert_envelope_exclusive(&response.json);
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn missing_prompt_message_is_fixed_text() {
    let response = get(router_with(Arc::new(MockTextProvider::new(MockBehavior::Echo))), "/").await;

    assert_eq!(
        response.json["error"],
        "Prompt missing! Add a prompt to the URL using ?prompt="
    );
}

#[tokio::test]
async fn successful_generation_returns_text() {
    let provider = Arc::new(MockTextProvider::new(MockBehavior::Echo));

    let response = get(router_with(provider.clone()), "/?prompt=What%20is%20Rust%3F").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json,
        json!({
            "success": true,
            "response": "Mock response for: What is Rust?",
            "error": null
        })
    );
    assert_envelope_exclusive(&response.json);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn say_hello_produces_exact_body() {
    let provider = Arc::new(MockTextProvider::replying("Hello!"));

    let response = get(router_with(provider), "/?prompt=Say%20hello").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.raw,
        r#"{"success":true,"response":"Hello!","error":null}"#
    );
    assert_eq!(
        response.headers["content-type"],
        "application/json"
    );
}

#[tokio::test]
async fn upstream_error_message_is_reported() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::Api {
        status: 429,
        status_text: "Too Many Requests".to_string(),
        message: "quota exceeded".to_string(),
        error_details: vec![],
    }));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["success"], false);
    assert_eq!(response.json["response"], json!(null));
    assert_eq!(response.json["error"]["message"], "quota exceeded");
    assert_eq!(response.json["error"]["status"], 429);
    assert_eq!(response.json["error"]["statusText"], "Too Many Requests");
    assert!(response.json["error"].get("errorDetails").is_none());
    assert_envelope_exclusive(&response.json);
}

#[tokio::test]
async fn network_error_collapses_into_same_shape() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::Network(
        "connection reset".to_string(),
    )));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json,
        json!({
            "success": false,
            "response": null,
            "error": {"message": "connection reset"}
        })
    );
}

#[tokio::test]
async fn non_error_failure_falls_back_to_unknown_error() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::Unknown(Some(
        json!("plain string"),
    ))));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["error"], json!({"message": "Unknown error"}));
    assert_envelope_exclusive(&response.json);
}

#[tokio::test]
async fn undefined_failure_falls_back_to_unknown_error() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::Unknown(None)));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["error"]["message"], "Unknown error");
}

#[tokio::test]
async fn object_failure_attributes_are_merged() {
    let provider = Arc::new(MockTextProvider::failing(ProviderError::Unknown(Some(
        json!({"code": "E_GATEWAY", "retryable": true}),
    ))));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert_eq!(
        response.json["error"],
        json!({"message": "Unknown error", "code": "E_GATEWAY", "retryable": true})
    );
}

#[tokio::test]
async fn panicking_provider_is_reported_as_unknown_error() {
    let provider = Arc::new(MockTextProvider::new(MockBehavior::Panic(
        "provider exploded".to_string(),
    )));

    let response = get(router_with(provider.clone()), "/?prompt=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json["error"], json!({"message": "Unknown error"}));
    assert_envelope_exclusive(&response.json);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn any_method_and_path_reach_the_relay() {
    let provider = Arc::new(MockTextProvider::replying("ok"));

    for (method, uri) in [
        (Method::GET, "/v1/generate?prompt=a"),
        (Method::POST, "/?prompt=a"),
        (Method::PUT, "/deeply/nested/path?prompt=a"),
    ] {
        let response = send(router_with(provider.clone()), method.clone(), uri).await;
        assert_eq!(response.status, StatusCode::OK, "{} {}", method, uri);
        assert_eq!(response.json["response"], "ok");
    }

    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn first_prompt_parameter_wins() {
    let provider = Arc::new(MockTextProvider::new(MockBehavior::Echo));

    let response = get(router_with(provider), "/?prompt=first&prompt=second").await;

    assert_eq!(response.json["response"], "Mock response for: first");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let provider = Arc::new(MockTextProvider::replying("ok"));

    let response = get(router_with(provider), "/?prompt=hi").await;

    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
}
