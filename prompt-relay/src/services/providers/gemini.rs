//! Gemini AI provider implementation.
//!
//! Calls `generateContent` on Google's Gemini API. Requests go to a
//! configurable base URL, which in production is the AI gateway's Google AI
//! Studio adapter rather than the provider's own host.

use super::{BlockReason, ProviderError, TextProvider};
use crate::config::RelayConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Gemini API version segment appended to the base URL.
const GEMINI_API_VERSION: &str = "v1beta";

/// Header carrying the provider API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons for which the candidate's text is withheld.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "LANGUAGE",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    /// Everything before `/v1beta/models/...`.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Route through the configured gateway.
    pub fn from_relay_config(config: &RelayConfig) -> Self {
        Self {
            api_key: config.google.api_key.clone(),
            model: config.models.text_model.clone(),
            base_url: config.gateway.base_url(),
            timeout: config.upstream.timeout,
        }
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, client })
    }

    /// Build the `generateContent` URL for the configured model.
    fn api_url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            GEMINI_API_VERSION,
            self.config.model
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .traced_post(&self.api_url())
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(transport_error)?;
            return Err(api_error(status, &body));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
            } else {
                transport_error(e)
            }
        })?;

        response_text(api_response)
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(format!("Request to Gemini API timed out: {}", e))
    } else {
        ProviderError::Network(format!("Error fetching from Gemini API: {}", e))
    }
}

/// Map a non-2xx response to a provider error.
///
/// A body with `error.message` becomes an API error. Any other JSON object is
/// kept whole as an unknown failure so its fields reach the caller. Bodies
/// that are not JSON objects are reported as raw text.
fn api_error(status: StatusCode, body: &str) -> ProviderError {
    let status_text = status.canonical_reason().unwrap_or_default().to_string();

    let (upstream_message, error_details) = match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => match serde_json::from_value::<ErrorBody>(value.clone()) {
            Ok(ErrorBody {
                error:
                    Some(ErrorPayload {
                        message: Some(message),
                        details,
                    }),
            }) => (message, details),
            _ => return ProviderError::Unknown(Some(value)),
        },
        _ => (body.trim().to_string(), Vec::new()),
    };

    let mut message = format!("[{} {}] {}", status.as_u16(), status_text, upstream_message);
    if !error_details.is_empty() {
        if let Ok(details) = serde_json::to_string(&error_details) {
            message.push(' ');
            message.push_str(&details);
        }
    }

    ProviderError::Api {
        status: status.as_u16(),
        status_text,
        message: message.trim_end().to_string(),
        error_details,
    }
}

/// Text of the first candidate, or the reason it was withheld.
fn response_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(candidate) = response.candidates.first() {
        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        {
            let mut message = format!("Candidate was blocked due to {}", reason);
            if let Some(detail) = &candidate.finish_message {
                message.push_str(": ");
                message.push_str(detail);
            }
            return Err(ProviderError::Blocked {
                message,
                reason: BlockReason::Candidate(reason.to_string()),
            });
        }

        let text = candidate
            .content
            .as_ref()
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
            .unwrap_or_default();
        return Ok(text);
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        let mut message = format!("Text not available. Response was blocked due to {}", reason);
        if let Some(detail) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason_message.as_deref())
        {
            message.push_str(": ");
            message.push_str(detail);
        }
        return Err(ProviderError::Blocked {
            message,
            reason: BlockReason::Prompt(reason.to_string()),
        });
    }

    Ok(String::new())
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    finish_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Vec<Value>,
}
