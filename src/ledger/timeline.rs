//! Cache hit/miss sequence for one conversation

use super::models::{CacheTimeline, Role, StoredMessage, TimelineEntry};

/// Pair the i-th user message with the i-th assistant message. A user
/// message without a reply yet (pending or failed turn) shows up as a
/// miss with no tokens.
pub fn build_cache_timeline(messages: &[StoredMessage]) -> CacheTimeline {
    let replies: Vec<&StoredMessage> = messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .collect();

    let entries: Vec<TimelineEntry> = messages
        .iter()
        .filter(|m| m.role == Role::User)
        .enumerate()
        .map(|(i, _)| {
            let reply = replies.get(i);
            TimelineEntry {
                index: i + 1,
                cached: reply.map(|r| r.carbon.cached).unwrap_or(false),
                tokens: reply.map(|r| r.carbon.cache_hit_tokens).unwrap_or(0),
            }
        })
        .collect();

    let hit_count = entries.iter().filter(|e| e.cached).count();
    let hit_rate = if entries.is_empty() {
        0
    } else {
        (hit_count as f64 / entries.len() as f64 * 100.0).round() as u32
    };

    CacheTimeline {
        entries,
        hit_count,
        hit_rate,
    }
}
