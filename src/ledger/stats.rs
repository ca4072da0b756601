//! Aggregate statistics over the message store

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::models::{AggregateStats, Role, StoredMessage};

/// Which conversations feed an aggregate
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AggregationScope {
    #[default]
    AllConversations,
    Conversation(String),
}

impl AggregationScope {
    /// Parse the `SORCER_STATS_SCOPE` setting: `all` (or empty) for
    /// every conversation, anything else is treated as a chat id.
    pub fn from_config_value(value: &str) -> Self {
        match value.trim() {
            "" | "all" => AggregationScope::AllConversations,
            chat_id => AggregationScope::Conversation(chat_id.to_string()),
        }
    }

    pub fn from_chat_id(chat_id: Option<String>) -> Self {
        match chat_id {
            Some(id) if !id.is_empty() => AggregationScope::Conversation(id),
            _ => AggregationScope::AllConversations,
        }
    }
}

pub fn compute_aggregate_stats(messages: &[StoredMessage]) -> AggregateStats {
    let total_prompts = messages.iter().filter(|m| m.role == Role::User).count() as u64;
    let total_chats = messages.iter().map(|m| m.chat_id.as_str()).unique().count() as u64;

    let mut total_saved = 0.0;
    let mut total_cache_hit_tokens = 0;
    let mut reductions = Vec::new();
    let mut compression_sum = 0.0;
    let mut compression_count = 0;

    for m in messages.iter().filter(|m| m.role == Role::Assistant) {
        if m.carbon.compressed {
            compression_sum += m.carbon.compression_ratio;
            compression_count += 1;
        }

        // Fallback turns never reached a model so they don't count
        if !m.carbon.is_billed() {
            continue;
        }
        total_saved += m.carbon.saved_g;
        total_cache_hit_tokens += m.carbon.cache_hit_tokens;
        if let Some(pct) = m.carbon.reduction_percent() {
            reductions.push(pct);
        }
    }

    let avg_reduction = if reductions.is_empty() {
        0.0
    } else {
        reductions.iter().sum::<f64>() / reductions.len() as f64
    };
    let avg_compression_ratio = if compression_count > 0 {
        compression_sum / compression_count as f64
    } else {
        0.0
    };

    AggregateStats {
        total_chats,
        total_prompts,
        total_carbon_saved_g: total_saved,
        avg_reduction,
        total_cache_hit_tokens,
        avg_compression_ratio,
    }
}
