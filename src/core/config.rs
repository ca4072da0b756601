use std::env;

use crate::ledger::AggregationScope;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub backend_url: String,
    pub user_id: String,
    pub voice_timeout_ms: u64,
    pub stats_interval_secs: u64,
    pub stats_scope: AggregationScope,
}

impl AppConfig {
    /// Path of the SQLite file holding the ledger
    pub fn db_file(&self) -> String {
        format!("{}/ledger.sqlite", self.db_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("SORCER_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let backend_url = env::var("SORCER_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let user_id = env::var("SORCER_USER_ID").unwrap_or_else(|_| "sorcer-user".to_string());
        let voice_timeout_ms = env::var("SORCER_VOICE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);
        let stats_interval_secs = env::var("SORCER_STATS_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let stats_scope = env::var("SORCER_STATS_SCOPE")
            .map(|v| AggregationScope::from_config_value(&v))
            .unwrap_or_default();

        Self {
            storage_path,
            db_path,
            backend_url,
            user_id,
            voice_timeout_ms,
            stats_interval_secs,
            stats_scope,
        }
    }
}
