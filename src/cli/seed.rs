use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::ledger::db::clear_messages;
use crate::ledger::seed::seed_if_empty;

pub async fn run(config: &AppConfig) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    let inserted = seed_if_empty(&db).await?;
    if inserted == 0 {
        println!("Ledger already has data, nothing seeded");
    } else {
        println!("Seeded {} demo chats", inserted);
    }
    Ok(())
}

pub async fn clear(config: &AppConfig) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    clear_messages(&db).await?;
    println!("Cleared all messages and chats");
    Ok(())
}
