use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::models::{ChatRecord, DEFAULT_CHAT_TITLE, Role, StoredMessage};
use super::stats::AggregationScope;

const SIDEBAR_COLLAPSED_KEY: &str = "sidebar-collapsed";
const TITLE_ANIMATED_PREFIX: &str = "title-animated:";
const TITLE_MAX_CHARS: usize = 50;

type MessageRow = (String, String, String, String, String, String);

fn message_from_row(row: MessageRow) -> Result<StoredMessage> {
    let (id, chat_id, role, content, created_at, carbon) = row;
    Ok(StoredMessage {
        id,
        chat_id,
        role: role.parse::<Role>()?,
        content,
        created_at,
        carbon: serde_json::from_str(&carbon)?,
    })
}

fn messages_from_rows(rows: Vec<MessageRow>) -> Result<Vec<StoredMessage>> {
    rows.into_iter().map(message_from_row).collect()
}

pub async fn insert_message(db: &Connection, msg: &StoredMessage) -> Result<usize, Error> {
    let msg = msg.clone();
    let carbon = serde_json::to_string(&msg.carbon)?;
    let result = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO message (id, chat_id, role, content, created_at, carbon) VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            let result = stmt.execute(params![
                msg.id,
                msg.chat_id,
                msg.role.as_str(),
                msg.content,
                msg.created_at,
                carbon
            ])?;
            Ok(result)
        })
        .await?;

    Ok(result)
}

/// Append a message to the store. The ledger is a best-effort cache so
/// a storage failure is logged and otherwise ignored.
pub async fn append_message(db: &Connection, msg: &StoredMessage) {
    if let Err(e) = insert_message(db, msg).await {
        tracing::warn!("Dropping message {} for chat {}: {}", msg.id, msg.chat_id, e);
    }
}

pub async fn find_all_messages(db: &Connection) -> Result<Vec<StoredMessage>, Error> {
    let rows = db
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, role, content, created_at, carbon FROM message ORDER BY seq",
            )?;
            let rows = stmt
                .query_map([], |r| {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?))
                })?
                .collect::<Result<Vec<MessageRow>, _>>()?;
            Ok(rows)
        })
        .await?;

    messages_from_rows(rows)
}

pub async fn find_messages_by_chat_id(
    db: &Connection,
    chat_id: &str,
) -> Result<Vec<StoredMessage>, Error> {
    let c_id = chat_id.to_owned();
    let rows = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, chat_id, role, content, created_at, carbon FROM message WHERE chat_id = ? ORDER BY seq",
            )?;
            let rows = stmt
                .query_map([c_id], |r| {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?))
                })?
                .collect::<Result<Vec<MessageRow>, _>>()?;
            Ok(rows)
        })
        .await?;

    messages_from_rows(rows)
}

pub async fn find_messages(
    db: &Connection,
    scope: &AggregationScope,
) -> Result<Vec<StoredMessage>, Error> {
    match scope {
        AggregationScope::AllConversations => find_all_messages(db).await,
        AggregationScope::Conversation(chat_id) => find_messages_by_chat_id(db, chat_id).await,
    }
}

/// Read messages for display. Storage errors degrade to an empty
/// ledger instead of failing the caller.
pub async fn load_messages(db: &Connection, scope: &AggregationScope) -> Vec<StoredMessage> {
    find_messages(db, scope).await.unwrap_or_else(|e| {
        tracing::warn!("Ledger unavailable, using an empty store: {}", e);
        vec![]
    })
}

/// Remove every message and chat record
pub async fn clear_messages(db: &Connection) -> Result<(), Error> {
    db.call(|conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM message", [])?;
        tx.execute("DELETE FROM chat", [])?;
        tx.commit()?;
        Ok(())
    })
    .await?;
    Ok(())
}

fn chat_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<ChatRecord> {
    Ok(ChatRecord {
        id: r.get(0)?,
        title: r.get(1)?,
        created_at: r.get(2)?,
        carbon_saved: r.get(3)?,
        prompt_count: r.get::<_, i64>(4)? as u64,
        model: r.get(5)?,
        region: r.get(6)?,
    })
}

pub async fn create_chat(db: &Connection, chat: &ChatRecord) -> Result<(), Error> {
    let chat = chat.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT OR IGNORE INTO chat (id, title, created_at, carbon_saved, prompt_count, model, region) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                chat.id,
                chat.title,
                chat.created_at,
                chat.carbon_saved,
                chat.prompt_count as i64,
                chat.model,
                chat.region
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn find_chat_by_id(db: &Connection, chat_id: &str) -> Result<Option<ChatRecord>, Error> {
    let c_id = chat_id.to_owned();
    let chat = db
        .call(move |conn| {
            let chat = conn
                .query_row(
                    "SELECT id, title, created_at, carbon_saved, prompt_count, model, region FROM chat WHERE id = ?",
                    [c_id],
                    chat_from_row,
                )
                .optional()?;
            Ok(chat)
        })
        .await?;
    Ok(chat)
}

/// All chats, newest first
pub async fn find_all_chats(db: &Connection) -> Result<Vec<ChatRecord>, Error> {
    let chats = db
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at, carbon_saved, prompt_count, model, region FROM chat ORDER BY created_at DESC",
            )?;
            let chats = stmt
                .query_map([], chat_from_row)?
                .collect::<Result<Vec<ChatRecord>, _>>()?;
            Ok(chats)
        })
        .await?;
    Ok(chats)
}

fn title_from_prompt(prompt: &str) -> String {
    if prompt.chars().count() > TITLE_MAX_CHARS {
        let head: String = prompt.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        prompt.to_string()
    }
}

/// Count a prompt against the chat and name the chat after its first
/// prompt while it still has the default title
pub async fn record_prompt(db: &Connection, chat_id: &str, prompt: &str) -> Result<(), Error> {
    let c_id = chat_id.to_owned();
    let title = title_from_prompt(prompt);
    db.call(move |conn| {
        conn.execute(
            "UPDATE chat SET prompt_count = prompt_count + 1, title = CASE WHEN title = ? OR prompt_count = 0 THEN ? ELSE title END WHERE id = ?",
            params![DEFAULT_CHAT_TITLE, title, c_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn record_response(
    db: &Connection,
    chat_id: &str,
    saved_g: f64,
    model: &str,
    region: &str,
) -> Result<(), Error> {
    let c_id = chat_id.to_owned();
    let model = model.to_owned();
    let region = region.to_owned();
    db.call(move |conn| {
        conn.execute(
            "UPDATE chat SET carbon_saved = carbon_saved + ?, model = ?, region = ? WHERE id = ?",
            params![saved_g, model, region, c_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn delete_chat(db: &Connection, chat_id: &str) -> Result<bool, Error> {
    let c_id = chat_id.to_owned();
    let deleted = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM message WHERE chat_id = ?", [&c_id])?;
            let deleted = tx.execute("DELETE FROM chat WHERE id = ?", [&c_id])?;
            tx.commit()?;
            Ok(deleted > 0)
        })
        .await?;
    Ok(deleted)
}

pub async fn get_preference(db: &Connection, key: &str) -> Result<Option<String>, Error> {
    let k = key.to_owned();
    let value = db
        .call(move |conn| {
            let value = conn
                .query_row("SELECT value FROM preference WHERE key = ?", [k], |r| {
                    r.get::<_, String>(0)
                })
                .optional()?;
            Ok(value)
        })
        .await?;
    Ok(value)
}

pub async fn set_preference(db: &Connection, key: &str, value: &str) -> Result<(), Error> {
    let k = key.to_owned();
    let v = value.to_owned();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO preference (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [k, v],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn is_sidebar_collapsed(db: &Connection) -> Result<bool, Error> {
    Ok(get_preference(db, SIDEBAR_COLLAPSED_KEY).await?.as_deref() == Some("true"))
}

pub async fn set_sidebar_collapsed(db: &Connection, collapsed: bool) -> Result<(), Error> {
    set_preference(db, SIDEBAR_COLLAPSED_KEY, &collapsed.to_string()).await
}

fn title_animated_key(title: &str) -> String {
    let slug = title.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{}{}", TITLE_ANIMATED_PREFIX, slug)
}

pub async fn has_title_animated(db: &Connection, title: &str) -> Result<bool, Error> {
    Ok(get_preference(db, &title_animated_key(title)).await?.is_some())
}

pub async fn mark_title_animated(db: &Connection, title: &str) -> Result<(), Error> {
    set_preference(db, &title_animated_key(title), "1").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::setup_db;
    use crate::ledger::models::CarbonMeta;

    async fn test_db() -> Connection {
        let db = Connection::open_in_memory().await.unwrap();
        setup_db(&db).await.unwrap();
        db
    }

    fn reply(chat_id: &str, cost: f64, baseline: f64) -> StoredMessage {
        StoredMessage::assistant(
            chat_id,
            "Iowa runs on 89% carbon-free energy.",
            CarbonMeta {
                model: "google/gemini-2.5-flash-lite".to_string(),
                cost_g: cost,
                baseline_g: baseline,
                saved_g: baseline - cost,
                cached: true,
                cache_hit_tokens: 340,
                compressed: true,
                compression_ratio: 0.72,
                original_tokens: 24,
                compressed_tokens: 18,
                tokens_in: 24,
                tokens_out: 680,
                latency_ms: 890,
                region: "us-central1".to_string(),
                cfe_percent: 89.0,
            },
        )
    }

    #[tokio::test]
    async fn it_returns_an_empty_store() {
        let db = test_db().await;
        assert!(find_all_messages(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_round_trips_messages_in_insertion_order() {
        let db = test_db().await;
        let messages = vec![
            StoredMessage::user("chat-1", "carbon footprint of LLMs?"),
            reply("chat-1", 0.12, 0.57),
            StoredMessage::user("chat-2", "other chat"),
            StoredMessage::user("chat-1", "and caching?"),
            reply("chat-1", 0.08, 0.52),
        ];
        for m in &messages {
            append_message(&db, m).await;
        }

        let stored = find_all_messages(&db).await.unwrap();
        assert_eq!(stored, messages);

        // Reads don't mutate anything
        assert_eq!(find_all_messages(&db).await.unwrap(), messages);

        let chat_1 = find_messages_by_chat_id(&db, "chat-1").await.unwrap();
        assert_eq!(chat_1.len(), 4);
        assert_eq!(chat_1[2].content, "and caching?");
    }

    #[tokio::test]
    async fn it_preserves_carbon_values_exactly() {
        let db = test_db().await;
        let messages: Vec<StoredMessage> = (1..=2000)
            .map(|i| {
                let cost = (i as f64 * 0.7919).sin().abs() / 7.0;
                let baseline = cost + (i as f64).sqrt() / 97.0;
                reply("chat-1", cost, baseline)
            })
            .collect();
        for m in &messages {
            insert_message(&db, m).await.unwrap();
        }

        let stored = find_all_messages(&db).await.unwrap();
        assert_eq!(stored.len(), messages.len());
        for (read, written) in stored.iter().zip(&messages) {
            assert_eq!(read.carbon.cost_g.to_bits(), written.carbon.cost_g.to_bits());
            assert_eq!(read.carbon.baseline_g.to_bits(), written.carbon.baseline_g.to_bits());
            assert_eq!(read.carbon.saved_g.to_bits(), written.carbon.saved_g.to_bits());
        }
    }

    #[tokio::test]
    async fn it_swallows_append_failures() {
        // No schema, so every insert fails
        let db = Connection::open_in_memory().await.unwrap();
        append_message(&db, &StoredMessage::user("chat-1", "hello")).await;
        assert!(insert_message(&db, &StoredMessage::user("chat-1", "hello")).await.is_err());
        assert!(load_messages(&db, &AggregationScope::AllConversations).await.is_empty());
    }

    #[tokio::test]
    async fn it_clears_idempotently() {
        let db = test_db().await;
        create_chat(&db, &ChatRecord::new("chat-1")).await.unwrap();
        append_message(&db, &StoredMessage::user("chat-1", "hello")).await;

        clear_messages(&db).await.unwrap();
        clear_messages(&db).await.unwrap();
        assert!(find_all_messages(&db).await.unwrap().is_empty());
        assert!(find_all_chats(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_fails_to_list_chats_with_a_corrupt_row() {
        let db = test_db().await;
        create_chat(&db, &ChatRecord::new("chat-1")).await.unwrap();
        db.call(|conn| {
            conn.execute(
                "INSERT INTO chat (id, title, created_at, prompt_count) VALUES ('chat-2', 'Broken', '2026-01-01T00:00:00Z', 'many')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(find_all_chats(&db).await.is_err());
    }

    #[tokio::test]
    async fn it_tracks_chat_summaries() {
        let db = test_db().await;
        create_chat(&db, &ChatRecord::new("chat-1")).await.unwrap();

        let long_prompt = "What's the carbon footprint of running a large language model in different cloud regions?";
        record_prompt(&db, "chat-1", long_prompt).await.unwrap();
        record_response(&db, "chat-1", 0.45, "google/gemini-2.5-flash-lite", "us-central1")
            .await
            .unwrap();
        record_prompt(&db, "chat-1", "follow up").await.unwrap();

        let chat = find_chat_by_id(&db, "chat-1").await.unwrap().unwrap();
        assert_eq!(chat.prompt_count, 2);
        assert_eq!(chat.title.chars().count(), 53);
        assert!(chat.title.ends_with("..."));
        assert!((chat.carbon_saved - 0.45).abs() < 1e-9);
        assert_eq!(chat.region, "us-central1");

        assert!(find_chat_by_id(&db, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn it_deletes_a_chat_and_its_messages() {
        let db = test_db().await;
        create_chat(&db, &ChatRecord::new("chat-1")).await.unwrap();
        create_chat(&db, &ChatRecord::new("chat-2")).await.unwrap();
        append_message(&db, &StoredMessage::user("chat-1", "a")).await;
        append_message(&db, &StoredMessage::user("chat-2", "b")).await;

        assert!(delete_chat(&db, "chat-1").await.unwrap());
        assert!(!delete_chat(&db, "chat-1").await.unwrap());
        let remaining = find_all_messages(&db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].chat_id, "chat-2");
    }

    #[tokio::test]
    async fn it_stores_preferences() {
        let db = test_db().await;
        assert!(!is_sidebar_collapsed(&db).await.unwrap());
        set_sidebar_collapsed(&db, true).await.unwrap();
        assert!(is_sidebar_collapsed(&db).await.unwrap());
        set_sidebar_collapsed(&db, false).await.unwrap();
        assert!(!is_sidebar_collapsed(&db).await.unwrap());

        assert!(!has_title_animated(&db, "Carbon Ledger").await.unwrap());
        mark_title_animated(&db, "Carbon Ledger").await.unwrap();
        assert!(has_title_animated(&db, "Carbon Ledger").await.unwrap());
        assert_eq!(
            get_preference(&db, "title-animated:Carbon-Ledger").await.unwrap(),
            Some("1".to_string())
        );
    }
}
