use std::sync::Arc;

use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::jobs::{PeriodicJob, RefreshLedgerStats, StatsSnapshot};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum JobId {
    RefreshLedgerStats,
}

pub async fn run(config: &AppConfig, id: JobId) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    let snapshot = StatsSnapshot::default();

    let job: Box<dyn PeriodicJob> = match id {
        JobId::RefreshLedgerStats => {
            Box::new(RefreshLedgerStats::new(Arc::clone(&snapshot), config))
        }
    };

    println!("Running job: {:?}", id);
    job.run_job(config, &db).await;
    println!("Job completed");

    if let Ok(stats) = snapshot.read() {
        println!("{}", serde_json::to_string_pretty(&*stats)?);
    }

    Ok(())
}
