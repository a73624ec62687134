use crate::models::Envelope;
use crate::services::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures of a relay request, each rendered as an envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No usable `prompt` query parameter; no upstream call was made.
    #[error("prompt query parameter missing")]
    MissingPrompt,

    /// The upstream generation call failed, for whatever reason.
    #[error("upstream generation failed: {0}")]
    Upstream(#[from] ProviderError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            RelayError::MissingPrompt => (StatusCode::BAD_REQUEST, Envelope::missing_prompt()),
            RelayError::Upstream(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::failure(err.detail()),
            ),
        };

        (status, Json(envelope)).into_response()
    }
}
