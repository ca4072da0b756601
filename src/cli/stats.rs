use anyhow::Result;

use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::ledger::db::{find_all_chats, find_messages};
use crate::ledger::format::{format_grams, format_percent, ticker_lines};
use crate::ledger::{AggregationScope, build_cache_timeline, compute_aggregate_stats};

pub async fn run(config: &AppConfig, chat_id: Option<String>, json: bool) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    // An explicit chat id wins over the configured scope
    let scope = match chat_id {
        Some(id) => AggregationScope::Conversation(id),
        None => config.stats_scope.clone(),
    };
    let messages = find_messages(&db, &scope).await?;
    let stats = compute_aggregate_stats(&messages);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Chats:              {}", stats.total_chats);
    println!("Prompts:            {}", stats.total_prompts);
    println!("Carbon saved:       {}", format_grams(stats.total_carbon_saved_g));
    println!("Avg reduction:      {}", format_percent(stats.avg_reduction));
    println!("Cache hit tokens:   {}", stats.total_cache_hit_tokens);
    println!("Avg compression:    {:.2}", stats.avg_compression_ratio);
    println!();
    for line in ticker_lines(&stats) {
        println!("  {}", line);
    }

    Ok(())
}

pub async fn timeline(config: &AppConfig, chat_id: &str) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    let messages = find_messages(&db, &AggregationScope::Conversation(chat_id.to_string())).await?;
    let timeline = build_cache_timeline(&messages);

    if timeline.entries.is_empty() {
        println!("No prompts in chat {}", chat_id);
        return Ok(());
    }

    let bar: String = timeline
        .entries
        .iter()
        .map(|e| if e.cached { '█' } else { '░' })
        .collect();
    println!("{}", bar);
    for entry in &timeline.entries {
        println!(
            "#{:<3} {:<6} {} tokens",
            entry.index,
            if entry.cached { "hit" } else { "miss" },
            entry.tokens
        );
    }
    println!(
        "{} of {} prompts served from cache ({}%)",
        timeline.hit_count,
        timeline.entries.len(),
        timeline.hit_rate
    );

    Ok(())
}

pub async fn chats(config: &AppConfig) -> Result<()> {
    let db = async_db(&config.db_file()).await?;
    for chat in find_all_chats(&db).await? {
        println!(
            "{}  {:<50}  {:>3} prompts  {} saved  {}",
            chat.id,
            chat.title,
            chat.prompt_count,
            format_grams(chat.carbon_saved),
            chat.model
        );
    }
    Ok(())
}
