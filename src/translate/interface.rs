use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One call's worth of input for the external translation capability
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    /// Raw user text, passed through untouched
    pub text: String,
    /// System instruction selecting the per-direction behavior
    pub instructions: String,
    /// JSON schema the response payload must follow
    pub schema: serde_json::Value,
}

/// Structured payload the capability is asked to return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPayload {
    pub translated_text: String,
    #[serde(default)]
    pub reading: Option<String>,
}

/// What the page displays after a request resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub source_text: String,
    pub translated_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
}

impl TranslationResult {
    pub fn empty(source_text: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            translated_text: String::new(),
            reading: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translator API key is not configured")]
    MissingApiKey,

    #[error("translator base_url is required for provider {0}")]
    MissingBaseUrl(String),

    #[error("invalid translator configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported translation provider: {0}")]
    UnsupportedProvider(String),

    #[error("request to translation service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("translation service blocked the request: {0}")]
    Blocked(String),

    #[error("translation service returned no text")]
    EmptyResponse,

    #[error("malformed translation payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Interface for the external generative translation capability.
/// Implementations make exactly one remote call per `generate`.
#[async_trait]
pub trait TranslatorInterface: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<TranslationPayload, TranslateError>;

    /// Provider name for logs and the health endpoint
    fn provider(&self) -> &str;

    fn model(&self) -> &str;
}

/// Parse the JSON text a model produced into a payload.
///
/// Models occasionally wrap JSON in a markdown fence even when asked for
/// `application/json`, so a surrounding ```json block is stripped first.
pub fn parse_payload(raw: &str) -> Result<TranslationPayload, TranslateError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(body.trim())?)
}
