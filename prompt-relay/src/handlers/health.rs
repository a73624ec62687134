use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe; also reports which provider and model requests go to.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "prompt-relay",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.text_provider.name(),
        "model": state.text_provider.model(),
    }))
}
