use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::ledger::db::load_messages;
use crate::ledger::models::AggregateStats;
use crate::ledger::compute_aggregate_stats;

/// Latest aggregate for the configured scope, shared with the API
pub type StatsSnapshot = Arc<RwLock<AggregateStats>>;

/// Recomputes the ledger aggregate so live displays only ever read
#[derive(Debug)]
pub struct RefreshLedgerStats {
    snapshot: StatsSnapshot,
    every: Duration,
}

impl RefreshLedgerStats {
    pub fn new(snapshot: StatsSnapshot, config: &AppConfig) -> Self {
        Self {
            snapshot,
            every: Duration::from_secs(config.stats_interval_secs.max(1)),
        }
    }
}

#[async_trait]
impl super::PeriodicJob for RefreshLedgerStats {
    fn interval(&self) -> Duration {
        self.every
    }

    async fn run_job(&self, config: &AppConfig, db_conn: &Connection) {
        let messages = load_messages(db_conn, &config.stats_scope).await;
        let stats = compute_aggregate_stats(&messages);
        tracing::trace!(
            "Refreshed ledger stats: {} chats, {} prompts",
            stats.total_chats,
            stats.total_prompts
        );
        match self.snapshot.write() {
            Ok(mut current) => *current = stats,
            Err(e) => tracing::error!("Stats snapshot lock poisoned: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::setup_db;
    use crate::jobs::PeriodicJob;
    use crate::ledger::db::insert_message;
    use crate::ledger::models::{CarbonMeta, StoredMessage};

    #[tokio::test]
    async fn it_refreshes_the_snapshot() {
        let db = Connection::open_in_memory().await.unwrap();
        setup_db(&db).await.unwrap();
        insert_message(&db, &StoredMessage::user("chat-1", "hello grid")).await.unwrap();
        insert_message(
            &db,
            &StoredMessage::assistant(
                "chat-1",
                "hi",
                CarbonMeta {
                    cost_g: 0.2,
                    baseline_g: 0.8,
                    saved_g: 0.6,
                    ..Default::default()
                },
            ),
        )
        .await
        .unwrap();

        let config = AppConfig {
            stats_interval_secs: 0,
            ..AppConfig::default()
        };
        let snapshot = StatsSnapshot::default();
        let job = RefreshLedgerStats::new(Arc::clone(&snapshot), &config);
        assert_eq!(job.interval(), Duration::from_secs(1));

        job.run_job(&config, &db).await;
        let stats = snapshot.read().unwrap().clone();
        assert_eq!(stats.total_chats, 1);
        assert_eq!(stats.total_prompts, 1);
        assert!((stats.total_carbon_saved_g - 0.6).abs() < 1e-9);
    }
}
