use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::interface::{
    parse_payload, GenerateRequest, TranslateError, TranslationPayload, TranslatorInterface,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini `generateContent` client with structured JSON output
pub struct GeminiTranslator {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiTranslator {
    pub fn new(
        model: String,
        base_url: String,
        api_key: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        if api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey);
        }
        let client = Client::builder().timeout(timeout).build()?;
        info!("Initialized GeminiTranslator: model={}, base_url={}", model, base_url);
        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// First text part of the first candidate, or the reason there is none
fn extract_text(response: GeminiResponse) -> Result<String, TranslateError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(TranslateError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or(TranslateError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(TranslateError::Blocked("SAFETY".to_string()));
    }

    candidate
        .content
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or(TranslateError::EmptyResponse)
}

#[async_trait]
impl TranslatorInterface for GeminiTranslator {
    async fn generate(&self, request: &GenerateRequest) -> Result<TranslationPayload, TranslateError> {
        let body = GeminiRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &request.instructions }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &request.text }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
                response_schema: &request.schema,
            },
        };

        debug!("Sending Gemini request: model={}, chars={}", self.model, request.text.chars().count());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status { status, body });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let text = extract_text(gemini_response)?;
        parse_payload(&text)
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
