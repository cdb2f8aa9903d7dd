use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::interface::{
    parse_payload, GenerateRequest, TranslateError, TranslationPayload, TranslatorInterface,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI compatible chat-completions client.
/// The response schema travels inside the system message since
/// `json_object` mode does not accept one.
pub struct OpenAICompatibleTranslator {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl OpenAICompatibleTranslator {
    pub fn new(
        model: String,
        base_url: String,
        api_key: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, TranslateError> {
        let client = Client::builder().timeout(timeout).build()?;
        info!(
            "Initialized OpenAICompatibleTranslator: model={}, base_url={}",
            model, base_url
        );
        Ok(Self {
            client,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature,
        })
    }

    fn system_message(request: &GenerateRequest) -> String {
        format!(
            "{}\nRespond with a single JSON object matching this schema:\n{}",
            request.instructions.trim_end(),
            request.schema
        )
    }
}

#[async_trait]
impl TranslatorInterface for OpenAICompatibleTranslator {
    async fn generate(&self, request: &GenerateRequest) -> Result<TranslationPayload, TranslateError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: Self::system_message(request),
                },
                ChatMessage {
                    role: "user",
                    content: request.text.clone(),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!("Sending chat completion: model={}", self.model);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        // Local servers (ollama, llama.cpp) run without a key
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Status { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(TranslateError::EmptyResponse)?;

        parse_payload(&content)
    }

    fn provider(&self) -> &str {
        "openai_compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
