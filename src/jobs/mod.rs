//! Background jobs run on a fixed interval alongside the server

use std::time::Duration;

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

mod refresh_ledger_stats;

pub use refresh_ledger_stats::{RefreshLedgerStats, StatsSnapshot};

#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self, config: &AppConfig, db_conn: &Connection);
}

/// Run `job` immediately and then again every `job.interval()` in its
/// own tokio task
pub fn spawn_periodic_job<T: PeriodicJob>(config: AppConfig, db: Connection, job: T) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(job.interval());
        // A slow run shouldn't cause a burst of catch-up runs
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            job.run_job(&config, &db).await;
        }
    });
}
