use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides, e.g.
/// `LAZY_TRANSLATOR__SYSTEM_CONFIG__PORT=9000`
pub const ENV_PREFIX: &str = "LAZY_TRANSLATOR";

/// Environment variables consulted when the config leaves `api_key` empty
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub translator_config: TranslatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the page's static files
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Idle interval before typed or dictated text is translated
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    12393
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_debounce_ms() -> u64 {
    800
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// "gemini" or "openai_compatible"
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            api_key: String::new(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Load a JSON or YAML config file, then apply environment overrides
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = load_text_file(path)?;
        let content = substitute_env_vars(&content);

        let path_lower = path.to_lowercase();
        let format = if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
            ::config::FileFormat::Json
        } else {
            ::config::FileFormat::Yaml
        };

        let source = ::config::File::from_str(&content, format);
        Self::build(Some(source)).with_context(|| format!("Invalid configuration in {}", path))
    }

    /// Defaults plus environment overrides, for running without a file
    pub fn from_env() -> Result<Self> {
        Self::build(None)
    }

    fn build(file: Option<::config::File<::config::FileSourceString, ::config::FileFormat>>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.translator_config.resolve_api_key();
        Ok(config)
    }
}

impl TranslatorConfig {
    fn resolve_api_key(&mut self) {
        self.resolve_api_key_with(|var| std::env::var(var).ok());
    }

    fn resolve_api_key_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let key = self.api_key.trim();
        // an unresolved `${VAR}` counts as unset
        if !key.is_empty() && !key.starts_with("${") {
            return;
        }
        self.api_key.clear();
        if let Some(key) = API_KEY_VARS
            .iter()
            .find_map(|var| lookup(*var).filter(|v| !v.trim().is_empty()))
        {
            debug!("Using translator API key from environment");
            self.api_key = key;
        }
    }
}

/// Replace `${VAR_NAME}` with the variable's value; unknown variables are left as-is
pub fn substitute_env_vars(content: &str) -> String {
    let pattern = Regex::new(r"\$\{(\w+)\}").expect("static regex");
    pattern
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// Read a text file as UTF-8, tolerating a byte-order mark
fn load_text_file(path: &str) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        anyhow::bail!("Configuration file is not valid UTF-8: {}", path);
    }
    Ok(text.into_owned())
}
