//! The JSON envelope returned for every relay outcome.

use serde::Serialize;
use serde_json::{Map, Value};

/// Fixed message for a request without a usable `prompt` parameter.
pub const MISSING_PROMPT_MESSAGE: &str = "Prompt missing! Add a prompt to the URL using ?prompt=";

/// `{ success, response, error }`.
///
/// Fields are private so an envelope can only be built through the
/// constructors, which keep exactly one of `response`/`error` set and
/// `success` true iff `response` is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    success: bool,
    response: Option<String>,
    error: Option<EnvelopeError>,
}

/// Error slot of the envelope: a fixed string for local validation failures,
/// a structured detail for upstream failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeError {
    Message(String),
    Detail(ErrorDetail),
}

/// Error detail with a guaranteed `message` and best-effort extra attributes
/// flattened next to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extra: Map::new(),
        }
    }
}

impl Envelope {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(text.into()),
            error: None,
        }
    }

    pub fn missing_prompt() -> Self {
        Self {
            success: false,
            response: None,
            error: Some(EnvelopeError::Message(MISSING_PROMPT_MESSAGE.to_string())),
        }
    }

    pub fn failure(detail: ErrorDetail) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(EnvelopeError::Detail(detail)),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn error(&self) -> Option<&EnvelopeError> {
        self.error.as_ref()
    }
}
