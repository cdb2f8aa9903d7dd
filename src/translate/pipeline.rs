use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

use crate::direction::Direction;
use super::interface::{GenerateRequest, TranslationResult, TranslatorInterface};

/// Shown in place of a translation when the service call fails
pub const ERROR_PLACEHOLDER: &str = "Error translating...";

const BASE_INSTRUCTIONS: &str = "You are a precise, real-time translator app named \"For KNTX\".
Your ONLY task is to translate the input text.
DO NOT provide explanations, pleasantries, or notes.
";

const TH_TO_JP_INSTRUCTIONS: &str = "Thai to Japanese:
- Translate the Thai text to natural Japanese.
- Provide the Japanese text in translatedText (using Kanji/Kana as appropriate).
- Provide the reading in Hiragana in the reading field.
";

const JP_TO_TH_INSTRUCTIONS: &str = "Japanese to Thai:
- Translate the Japanese text to natural Thai.
- The reading field must be null.
";

/// System instruction for one direction
pub fn instructions_for(direction: Direction) -> String {
    let case = match direction {
        Direction::ThToJp => TH_TO_JP_INSTRUCTIONS,
        Direction::JpToTh => JP_TO_TH_INSTRUCTIONS,
    };
    format!("{}\n{}", BASE_INSTRUCTIONS, case)
}

/// Response schema shared by both directions
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "translatedText": {
                "type": "STRING",
                "description": "The translated text result."
            },
            "reading": {
                "type": "STRING",
                "description": "The hiragana reading if target is Japanese, otherwise null.",
                "nullable": true
            }
        },
        "required": ["translatedText"]
    })
}

/// Turns settled text into a `TranslationResult`. Always resolves: failures
/// become `ERROR_PLACEHOLDER` so callers can clear their loading state.
#[derive(Clone)]
pub struct TranslationPipeline {
    translator: Arc<dyn TranslatorInterface>,
}

impl TranslationPipeline {
    pub fn new(translator: Arc<dyn TranslatorInterface>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &Arc<dyn TranslatorInterface> {
        &self.translator
    }

    pub async fn translate(&self, text: &str, direction: Direction) -> TranslationResult {
        if text.trim().is_empty() {
            return TranslationResult::empty(text);
        }

        let request = GenerateRequest {
            text: text.to_string(),
            instructions: instructions_for(direction),
            schema: response_schema(),
        };

        match self.translator.generate(&request).await {
            Ok(payload) => {
                debug!("Translated {} chars ({})", text.chars().count(), direction);
                let reading = payload
                    .reading
                    .filter(|_| direction.wants_reading())
                    .filter(|reading| !reading.trim().is_empty());
                TranslationResult {
                    source_text: text.to_string(),
                    translated_text: payload.translated_text,
                    reading,
                }
            }
            Err(e) => {
                error!("Translation error ({}): {}", self.translator.provider(), e);
                TranslationResult {
                    source_text: text.to_string(),
                    translated_text: ERROR_PLACEHOLDER.to_string(),
                    reading: None,
                }
            }
        }
    }
}
