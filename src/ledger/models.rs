use anyhow::{Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(anyhow!("Unknown message role {}", other)),
        }
    }
}

/// Carbon accounting attached to every stored message. User messages
/// carry a zeroed record, assistant messages carry what the backend
/// reported for the turn (or zero cost when no backend call happened).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CarbonMeta {
    pub model: String,
    pub cost_g: f64,
    pub baseline_g: f64,
    pub saved_g: f64,
    pub cached: bool,
    pub cache_hit_tokens: u64,
    pub compressed: bool,
    pub compression_ratio: f64,
    #[serde(default)]
    pub original_tokens: u64,
    #[serde(default)]
    pub compressed_tokens: u64,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub latency_ms: u64,
    pub region: String,
    pub cfe_percent: f64,
}

impl Default for CarbonMeta {
    fn default() -> Self {
        Self {
            model: String::new(),
            cost_g: 0.0,
            baseline_g: 0.0,
            saved_g: 0.0,
            cached: false,
            cache_hit_tokens: 0,
            compressed: false,
            compression_ratio: 1.0,
            original_tokens: 0,
            compressed_tokens: 0,
            tokens_in: 0,
            tokens_out: 0,
            latency_ms: 0,
            region: String::new(),
            cfe_percent: 0.0,
        }
    }
}

pub fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

impl CarbonMeta {
    pub fn for_user_prompt(content: &str) -> Self {
        Self {
            tokens_in: word_count(content),
            ..Default::default()
        }
    }

    /// Record for an assistant turn that was answered without a real
    /// backend response
    pub fn fallback(latency_ms: u64) -> Self {
        Self {
            latency_ms,
            ..Default::default()
        }
    }

    pub fn is_billed(&self) -> bool {
        self.cost_g > 0.0
    }

    /// Percentage of the baseline that was avoided, if there is a baseline
    pub fn reduction_percent(&self) -> Option<f64> {
        if self.baseline_g > 0.0 {
            Some(self.saved_g / self.baseline_g * 100.0)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.cost_g.is_finite() || self.cost_g < 0.0 {
            return Err(anyhow!("cost_g must be a non-negative number"));
        }
        if !self.baseline_g.is_finite() || !self.saved_g.is_finite() {
            return Err(anyhow!("baseline_g and saved_g must be finite"));
        }
        if self.is_billed() {
            let expected = self.baseline_g - self.cost_g;
            let tolerance = 1e-6_f64.max(expected.abs() * 1e-6);
            if (self.saved_g - expected).abs() > tolerance {
                return Err(anyhow!(
                    "saved_g {} does not equal baseline_g - cost_g ({})",
                    self.saved_g,
                    expected
                ));
            }
        }
        if !self.cached && self.cache_hit_tokens != 0 {
            return Err(anyhow!("cache_hit_tokens must be 0 when cached is false"));
        }
        if !(self.compression_ratio > 0.0 && self.compression_ratio <= 1.0) {
            return Err(anyhow!("compression_ratio must be in (0, 1]"));
        }
        if !(0.0..=100.0).contains(&self.cfe_percent) {
            return Err(anyhow!("cfe_percent must be between 0 and 100"));
        }
        Ok(())
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct StoredMessage {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: String,
    pub carbon: CarbonMeta,
}

impl StoredMessage {
    pub fn new(chat_id: &str, role: Role, content: &str, carbon: CarbonMeta) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now().to_rfc3339(),
            carbon,
        }
    }

    pub fn user(chat_id: &str, content: &str) -> Self {
        Self::new(chat_id, Role::User, content, CarbonMeta::for_user_prompt(content))
    }

    pub fn assistant(chat_id: &str, content: &str, carbon: CarbonMeta) -> Self {
        Self::new(chat_id, Role::Assistant, content, carbon)
    }
}

pub const DEFAULT_CHAT_TITLE: &str = "New Conversation";

/// Summary row for one conversation
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChatRecord {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub carbon_saved: f64,
    pub prompt_count: u64,
    pub model: String,
    pub region: String,
}

impl ChatRecord {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            created_at: Utc::now().to_rfc3339(),
            carbon_saved: 0.0,
            prompt_count: 0,
            model: "auto".to_string(),
            region: "auto".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct AggregateStats {
    #[serde(rename = "totalChats")]
    pub total_chats: u64,
    #[serde(rename = "totalPrompts")]
    pub total_prompts: u64,
    #[serde(rename = "totalCarbonSaved_g")]
    pub total_carbon_saved_g: f64,
    #[serde(rename = "avgReduction")]
    pub avg_reduction: f64,
    #[serde(rename = "totalCacheHitTokens")]
    pub total_cache_hit_tokens: u64,
    #[serde(rename = "avgCompressionRatio")]
    pub avg_compression_ratio: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TimelineEntry {
    pub index: usize,
    pub cached: bool,
    pub tokens: u64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct CacheTimeline {
    pub entries: Vec<TimelineEntry>,
    pub hit_count: usize,
    pub hit_rate: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billed(cost: f64, baseline: f64) -> CarbonMeta {
        CarbonMeta {
            model: "google/gemini-2.5-flash-lite".to_string(),
            cost_g: cost,
            baseline_g: baseline,
            saved_g: baseline - cost,
            region: "us-central1".to_string(),
            cfe_percent: 89.0,
            ..Default::default()
        }
    }

    #[test]
    fn it_accepts_consistent_carbon_meta() {
        assert!(billed(0.12, 0.57).validate().is_ok());
        assert!(CarbonMeta::for_user_prompt("hello there").validate().is_ok());
        assert!(CarbonMeta::fallback(120).validate().is_ok());
    }

    #[test]
    fn it_rejects_inconsistent_savings() {
        let mut meta = billed(0.5, 2.0);
        meta.saved_g = 1.0;
        assert!(meta.validate().is_err());
    }

    #[test]
    fn it_rejects_cache_tokens_without_cache_hit() {
        let mut meta = billed(0.5, 2.0);
        meta.cache_hit_tokens = 10;
        assert!(meta.validate().is_err());
        meta.cached = true;
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn it_rejects_out_of_range_ratios() {
        let mut meta = billed(0.5, 2.0);
        meta.compression_ratio = 0.0;
        assert!(meta.validate().is_err());
        meta.compression_ratio = 0.7;
        meta.cfe_percent = 101.0;
        assert!(meta.validate().is_err());
    }

    #[test]
    fn it_counts_prompt_words_for_user_messages() {
        let msg = StoredMessage::user("chat-1", "How does prompt caching help?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.carbon.tokens_in, 5);
        assert_eq!(msg.carbon.cost_g, 0.0);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn it_serializes_aggregate_stats_with_display_names() {
        let stats = AggregateStats {
            total_chats: 1,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalChats\":1"));
        assert!(json.contains("\"totalCarbonSaved_g\""));
    }
}
