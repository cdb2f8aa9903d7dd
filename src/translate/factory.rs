use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::TranslatorConfig;
use super::gemini::{GeminiTranslator, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use super::interface::{TranslateError, TranslatorInterface};
use super::openai_compatible::OpenAICompatibleTranslator;

/// Factory for the translation capability client
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator based on the configuration.
    ///
    /// # Arguments
    /// * `config` - Translator section of the application config
    pub fn create_translator(
        config: &TranslatorConfig,
    ) -> Result<Arc<dyn TranslatorInterface>, TranslateError> {
        info!("Initializing translator: {}", config.provider);
        if config.request_timeout_secs == 0 {
            return Err(TranslateError::InvalidConfig(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        let timeout = Duration::from_secs(config.request_timeout_secs);

        match config.provider.as_str() {
            "gemini" | "gemini_llm" => Ok(Arc::new(GeminiTranslator::new(
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                config.api_key.clone(),
                config.temperature,
                timeout,
            )?)),
            "openai_compatible" | "openai_compatible_llm" | "ollama_llm" => {
                let base_url = config
                    .base_url
                    .clone()
                    .ok_or_else(|| TranslateError::MissingBaseUrl(config.provider.clone()))?;
                Ok(Arc::new(OpenAICompatibleTranslator::new(
                    config.model.clone().unwrap_or_default(),
                    base_url,
                    config.api_key.clone(),
                    config.temperature,
                    timeout,
                )?))
            }
            other => Err(TranslateError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> TranslatorConfig {
        TranslatorConfig {
            provider: provider.to_string(),
            api_key: "test-key".to_string(),
            ..TranslatorConfig::default()
        }
    }

    #[test]
    fn test_gemini_defaults_model() {
        let translator = TranslatorFactory::create_translator(&config("gemini")).unwrap();
        assert_eq!(translator.provider(), "gemini");
        assert_eq!(translator.model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_openai_compatible_requires_base_url() {
        let result = TranslatorFactory::create_translator(&config("openai_compatible"));
        assert!(matches!(result, Err(TranslateError::MissingBaseUrl(_))));

        let mut with_url = config("ollama_llm");
        with_url.base_url = Some("http://localhost:11434/v1".to_string());
        with_url.model = Some("qwen2.5".to_string());
        let translator = TranslatorFactory::create_translator(&with_url).unwrap();
        assert_eq!(translator.provider(), "openai_compatible");
        assert_eq!(translator.model(), "qwen2.5");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = TranslatorFactory::create_translator(&config("deepl"));
        assert!(matches!(result, Err(TranslateError::UnsupportedProvider(name)) if name == "deepl"));
    }

    #[test]
    fn test_gemini_without_key_is_rejected() {
        let mut cfg = config("gemini");
        cfg.api_key = String::new();
        let result = TranslatorFactory::create_translator(&cfg);
        assert!(matches!(result, Err(TranslateError::MissingApiKey)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut cfg = config("gemini");
        cfg.request_timeout_secs = 0;
        let result = TranslatorFactory::create_translator(&cfg);
        assert!(matches!(result, Err(TranslateError::InvalidConfig(_))));
    }
}
