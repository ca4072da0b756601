//! Public types for the ledger API

use serde::{Deserialize, Serialize};

use crate::ledger::gamification::Badge;
use crate::ledger::models::{AggregateStats, CarbonMeta, ChatRecord, Role, StoredMessage};

/// Filter messages, stats or anything else scoped to one conversation
#[derive(Deserialize)]
pub struct ChatScopeQuery {
    pub chat_id: Option<String>,
}

/// Request to append a message to the ledger
#[derive(Deserialize)]
pub struct NewMessageRequest {
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    /// Defaults to a zeroed record sized to the content
    pub carbon: Option<CarbonMeta>,
}

#[derive(Deserialize)]
pub struct NewChatRequest {
    pub id: Option<String>,
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ChatDetailResponse {
    pub chat: ChatRecord,
    pub messages: Vec<StoredMessage>,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub chat_id: Option<String>,
    /// Read the snapshot kept by the refresh job instead of computing
    #[serde(default)]
    pub live: bool,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: AggregateStats,
    pub ticker: Vec<String>,
}

#[derive(Deserialize)]
pub struct ScoreQuery {
    pub eco_mode_percent: Option<f64>,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub score: u32,
    pub badges: Vec<Badge>,
}
