use crate::core::AppConfig;
use crate::core::db::{async_db, run_migrations};
use anyhow::Result;

pub async fn run(config: &AppConfig) -> Result<()> {
    println!("Migrating db...");
    let db = async_db(&config.db_file()).await?;
    run_migrations(&db).await?;
    println!("Finished migrating db");

    Ok(())
}
