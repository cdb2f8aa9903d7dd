use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::config::Config;
use crate::translate::TranslationPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: TranslationPipeline,
    /// Running session loops, keyed by client uid
    pub sessions: Arc<DashMap<String, AbortHandle>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, pipeline: TranslationPipeline) -> Self {
        Self {
            config,
            pipeline,
            sessions: Arc::new(DashMap::new()),
            started_at: Utc::now(),
        }
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.config.system_config.debounce_ms)
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}
