//! Short spoken answers proxied through the orchestrator

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::client::OrchestratorClient;
use super::models::OrchestrateRequest;

const VOICE_PREFIX: &str = "[Voice mode - respond in 1-2 short sentences only]";
const VOICE_USER_ID: &str = "sorcer-voice-user";
const VOICE_PROJECT_ID: &str = "voice-session";
const MAX_SENTENCES: usize = 2;

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());
static ARITHMETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*([+\-*/x×])\s*(\d+)").unwrap());

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct VoiceMessage {
    pub role: String,
    pub content: String,
}

/// The last message the user said, if any
pub fn last_user_message(messages: &[VoiceMessage]) -> Option<&VoiceMessage> {
    messages.iter().rev().find(|m| m.role == "user")
}

/// Keep at most the first two sentences of a reply
pub fn trim_sentences(text: &str) -> String {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
        if sentences.len() == MAX_SENTENCES {
            break;
        }
    }
    if sentences.len() < MAX_SENTENCES && start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences.join(" ")
}

/// Ask the orchestrator for a spoken answer. Any failure, including
/// running past `timeout`, returns `None` so the caller can answer
/// locally instead.
pub async fn voice_response(
    client: &OrchestratorClient,
    messages: &[VoiceMessage],
    timeout: Duration,
) -> Option<String> {
    let user_msg = last_user_message(messages)?;
    let req = OrchestrateRequest {
        prompt: format!("{} {}", VOICE_PREFIX, user_msg.content),
        user_id: VOICE_USER_ID.to_string(),
        project_id: VOICE_PROJECT_ID.to_string(),
        ..Default::default()
    };

    match client.orchestrate_with_timeout(&req, timeout).await {
        Ok(resp) if !resp.response.trim().is_empty() => Some(trim_sentences(resp.response.trim())),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Voice response unavailable: {}", e);
            None
        }
    }
}

fn arithmetic_reply(input: &str) -> Option<String> {
    let caps = ARITHMETIC.captures(input)?;
    let a: i64 = caps[1].parse().ok()?;
    let b: i64 = caps[3].parse().ok()?;
    let op = &caps[2];
    let result = match op {
        "+" => a.checked_add(b)?.to_string(),
        "-" => a.checked_sub(b)?.to_string(),
        "/" if b == 0 => return None,
        "/" => format!("{}", (a as f64 / b as f64 * 100.0).round() / 100.0),
        _ => a.checked_mul(b)?.to_string(),
    };
    let shown_op = if op == "x" || op == "×" { "*" } else { op };
    Some(format!(
        "{} {} {} equals {}. That one came straight from cache, zero carbon used.",
        a, shown_op, b, result
    ))
}

/// Offline reply used when the backend has nothing to say
pub fn fallback_reply(input: &str) -> String {
    let lower = input.to_lowercase();
    if let Some(reply) = arithmetic_reply(&lower) {
        return reply;
    }

    let topics: &[(&[&str], &str)] = &[
        (
            &["carbon", "co2", "emission"],
            "Sorcer routes your prompts to data centers running on clean energy, saving about half a gram of CO2 per prompt compared with a fossil-heavy region.",
        ),
        (
            &["cache"],
            "The semantic cache is shared across users, so similar questions get instant answers with no extra compute.",
        ),
        (
            &["data center", "datacenter"],
            "Data centers draw a growing share of grid power, which is why routing to regions with clean energy matters.",
        ),
        (
            &["weather"],
            "I don't have live weather data, but windy and sunny days mean cleaner grids for routing.",
        ),
        (
            &["thank"],
            "You're welcome! Every conversation through Sorcer saves a little carbon.",
        ),
        (
            &["hello", "hey", "hi"],
            "Hey! I'm Sorcer. I find the cleanest energy for your AI queries. Ask me anything!",
        ),
    ];

    topics
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, reply)| reply.to_string())
        .unwrap_or_else(|| {
            "I'm running in offline mode right now. Try asking about carbon routing, caching or data centers!".to_string()
        })
}
