use crate::core::AppConfig;
use crate::core::db::{async_db, setup_db};
use anyhow::Result;
use std::fs;

pub async fn run(config: &AppConfig) -> Result<()> {
    println!("Initializing db...");
    fs::create_dir_all(&config.db_path)
        .unwrap_or_else(|err| println!("Ignoring db directory create failed: {}", err));

    let db = async_db(&config.db_file()).await?;
    setup_db(&db).await?;
    println!("Finished initializing db at {}", config.db_file());

    Ok(())
}
