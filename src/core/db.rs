use anyhow::Result;
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chat (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    carbon_saved REAL NOT NULL DEFAULT 0,
    prompt_count INTEGER NOT NULL DEFAULT 0,
    model TEXT NOT NULL DEFAULT 'auto',
    region TEXT NOT NULL DEFAULT 'auto'
);

CREATE TABLE IF NOT EXISTS message (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    chat_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    carbon TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_message_chat_id ON message (chat_id);

CREATE TABLE IF NOT EXISTS preference (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Open the ledger database, creating the file if it doesn't exist
pub async fn async_db(db_file: &str) -> Result<Connection> {
    let db = Connection::open(db_file).await?;
    Ok(db)
}

pub fn initialize_db(conn: &mut SyncConnection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Bring an existing database up to the current schema. Every
/// statement is idempotent so this is safe to run repeatedly.
pub fn migrate_db(conn: &mut SyncConnection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.commit()?;
    Ok(())
}

/// Create the schema on an async connection
pub async fn setup_db(db: &Connection) -> Result<()> {
    db.call(|conn| Ok(initialize_db(conn))).await??;
    Ok(())
}

pub async fn run_migrations(db: &Connection) -> Result<()> {
    db.call(|conn| Ok(migrate_db(conn))).await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_initializes_and_migrates_idempotently() {
        let mut conn = SyncConnection::open_in_memory().unwrap();
        initialize_db(&mut conn).unwrap();
        migrate_db(&mut conn).unwrap();
        migrate_db(&mut conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('chat', 'message', 'preference')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
