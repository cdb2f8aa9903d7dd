mod config;
mod debounce;
mod dictation;
mod direction;
mod handlers;
mod routes;
mod session;
mod state;
mod translate;
mod websocket;

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;
use translate::{TranslationPipeline, TranslatorFactory};

const DEFAULT_LOG_FILTER: &str = "lazy_translator=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config()?;

    // Composition root: the one place the translation client is built
    let translator = TranslatorFactory::create_translator(&config.translator_config)?;
    let pipeline = TranslationPipeline::new(translator);

    let app_state = AppState::new(config.clone(), pipeline);

    // Build application
    let app = Router::new()
        .merge(routes::create_routes(&app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.system_config.host, config.system_config.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// First config file that loads wins; with none present, run on defaults
/// plus environment overrides.
fn load_config() -> Result<Config> {
    // Get the executable directory to resolve relative paths correctly
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
        exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
        exe_dir.join("conf.json").to_str().map(|s| s.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    for path in &config_paths {
        match Config::load(path) {
            Ok(config) => {
                info!("Loaded configuration from: {}", path);
                return Ok(config);
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {:#}", path, e);
            }
        }
    }

    warn!(
        "No config file found (tried {:?}); using defaults and environment",
        config_paths
    );
    Config::from_env()
}
