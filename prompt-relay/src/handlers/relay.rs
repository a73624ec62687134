use crate::error::RelayError;
use crate::models::Envelope;
use crate::services::metrics::{
    self, OUTCOME_MISSING_PROMPT, OUTCOME_SUCCESS, OUTCOME_UPSTREAM_ERROR,
};
use crate::services::ProviderError;
use crate::startup::AppState;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

/// Query parameter carrying the prompt.
const PROMPT_PARAM: &str = "prompt";

/// Relay `?prompt=` to the text provider and wrap the outcome in an envelope.
///
/// Mounted as the router fallback, so it answers every method and path not
/// claimed by an operational route.
pub async fn relay(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Envelope>, RelayError> {
    let Some(prompt) = prompt_param(query.as_deref()) else {
        metrics::record_relay_request(OUTCOME_MISSING_PROMPT);
        return Err(RelayError::MissingPrompt);
    };

    let provider = state.text_provider.as_ref();
    let started = Instant::now();

    let result = AssertUnwindSafe(provider.generate(&prompt))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(ProviderError::Unknown(panic_payload(payload))));

    metrics::record_provider_latency(
        provider.name(),
        provider.model(),
        started.elapsed().as_secs_f64(),
    );

    match result {
        Ok(text) => {
            tracing::info!(
                provider = %provider.name(),
                model = %provider.model(),
                prompt_len = prompt.len(),
                response_len = text.len(),
                "Generated response"
            );
            metrics::record_relay_request(OUTCOME_SUCCESS);
            Ok(Json(Envelope::ok(text)))
        }
        Err(err) => {
            tracing::error!(
                error = ?err,
                provider = %provider.name(),
                model = %provider.model(),
                "Upstream generation failed"
            );
            metrics::record_provider_error(provider.name(), err.kind());
            metrics::record_relay_request(OUTCOME_UPSTREAM_ERROR);
            Err(RelayError::Upstream(err))
        }
    }
}

/// First `prompt` value in the query string, if present and non-empty.
fn prompt_param(query: Option<&str>) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;

    pairs
        .into_iter()
        .find(|(key, _)| key == PROMPT_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Panic payloads are kept only when they are strings.
fn panic_payload(payload: Box<dyn Any + Send>) -> Option<Value> {
    match payload.downcast::<String>() {
        Ok(s) => Some(Value::String(*s)),
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| Value::String((*s).to_string())),
    }
}
