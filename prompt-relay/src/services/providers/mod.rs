//! AI provider abstractions and implementations.
//!
//! The relay talks to its model through the `TextProvider` trait so the
//! Gemini-through-gateway client can be swapped for a mock in tests.

pub mod gemini;
pub mod mock;

use crate::models::ErrorDetail;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Message reported when a failure carries nothing recognizable as an error.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Error type for provider operations.
///
/// Every variant collapses into the same HTTP 500 envelope; the variants only
/// decide which message and extra attributes end up in the error detail.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("{message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
        error_details: Vec<Value>,
    },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    InvalidResponse(String),

    #[error("{message}")]
    Blocked { message: String, reason: BlockReason },

    /// A failure value that is not error-shaped; object payloads are kept so
    /// their attributes can be reported.
    #[error("Unknown error")]
    Unknown(Option<Value>),
}

/// Why the provider refused to return text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The prompt itself was blocked (`promptFeedback.blockReason`).
    Prompt(String),
    /// The candidate stopped for a disallowed reason (`finishReason`).
    Candidate(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Api { .. } => "api",
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::Blocked { .. } => "blocked",
            ProviderError::Unknown(_) => "unknown",
        }
    }

    /// Build the error detail reported to callers: a guaranteed `message`
    /// plus whatever named attributes the failure carries.
    pub fn detail(&self) -> ErrorDetail {
        let mut extra = Map::new();

        let message = match self {
            ProviderError::Api {
                status,
                status_text,
                message,
                error_details,
            } => {
                extra.insert("status".to_string(), Value::from(*status));
                extra.insert("statusText".to_string(), Value::from(status_text.clone()));
                if !error_details.is_empty() {
                    extra.insert(
                        "errorDetails".to_string(),
                        Value::Array(error_details.clone()),
                    );
                }
                message.clone()
            }
            ProviderError::Blocked { message, reason } => {
                let (key, value) = match reason {
                    BlockReason::Prompt(r) => ("blockReason", r),
                    BlockReason::Candidate(r) => ("finishReason", r),
                };
                extra.insert(key.to_string(), Value::from(value.clone()));
                message.clone()
            }
            ProviderError::Unknown(Some(Value::Object(fields))) => {
                let mut message = UNKNOWN_ERROR_MESSAGE.to_string();
                for (key, value) in fields {
                    match (key.as_str(), value) {
                        // An own string `message` attribute wins over the fallback.
                        ("message", Value::String(m)) => message = m.clone(),
                        ("message", _) => {}
                        _ => {
                            extra.insert(key.clone(), value.clone());
                        }
                    }
                }
                message
            }
            ProviderError::Unknown(_) => UNKNOWN_ERROR_MESSAGE.to_string(),
            ProviderError::Network(_)
            | ProviderError::Timeout(_)
            | ProviderError::InvalidResponse(_) => self.to_string(),
        };

        ErrorDetail { message, extra }
    }
}

/// Trait for text generation providers.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Submit `prompt` as the whole content of one generation request and
    /// return the generated text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;
}
