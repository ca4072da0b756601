//! One chat turn: store the prompt, ask the orchestrator, store the reply

use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use tokio_rusqlite::Connection;

use super::db::{append_message, create_chat, find_chat_by_id, record_prompt, record_response};
use super::models::{CarbonMeta, ChatRecord, StoredMessage, word_count};
use crate::energy::EnergyState;
use crate::orchestrator::OrchestratorClient;
use crate::orchestrator::models::{OrchestrateRequest, Receipt};

const DEFAULT_BASELINE_G: f64 = 0.5;
const DEFAULT_ACTUAL_G: f64 = 0.1;
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_REGION: &str = "us-central1";
const DEFAULT_CFE_PERCENT: f64 = 85.0;

const DEFERRED_NOTICE: &str = "Your prompt has been queued for a greener window. The grid is carbon-heavy right now, so it will run once more renewable energy is available.";

fn round3(n: f64) -> f64 {
    (n * 1000.0).round() / 1000.0
}

fn cfe_percent(region: &str) -> f64 {
    match region {
        "us-central1" => 89.0,
        "us-west1" => 92.0,
        "europe-west1" => 82.0,
        _ => DEFAULT_CFE_PERCENT,
    }
}

fn eco_f64(eco_stats: &HashMap<String, Value>, key: &str) -> Option<f64> {
    eco_stats.get(key).and_then(Value::as_f64)
}

/// Build the carbon record of an assistant turn from what the backend
/// reported. Eco stats win over the receipt, missing values fall back
/// to fixed estimates. `latency_ms` is left for the caller.
pub fn carbon_meta_from_backend(
    eco_stats: &HashMap<String, Value>,
    receipt: Option<&Receipt>,
    prompt: &str,
    response: &str,
) -> CarbonMeta {
    let baseline_g = round3(
        eco_f64(eco_stats, "baseline_co2")
            .or(receipt.map(|r| r.baseline_co2_est))
            .unwrap_or(DEFAULT_BASELINE_G),
    );
    let cost_g = round3(
        eco_f64(eco_stats, "actual_co2")
            .or(receipt.map(|r| r.actual_co2))
            .unwrap_or(DEFAULT_ACTUAL_G),
    );
    // Savings are always derived so they balance against the baseline
    let saved_g = round3(baseline_g - cost_g);
    if let Some(reported) =
        eco_f64(eco_stats, "co2_saved_grams").or(receipt.map(|r| r.net_savings))
    {
        if (reported - saved_g).abs() > 0.001 {
            tracing::debug!(
                "Backend reported {}g saved, recording {}g from baseline and cost",
                reported,
                saved_g
            );
        }
    }

    let cached = eco_stats
        .get("was_cached")
        .and_then(Value::as_bool)
        .or(receipt.map(|r| r.was_cached))
        .unwrap_or(false);

    let model = receipt
        .map(|r| r.model_used.clone())
        .or_else(|| {
            eco_stats
                .get("model")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let model = if model.contains('/') {
        model
    } else {
        format!("google/{}", model)
    };

    let region = receipt
        .and_then(|r| r.server_location.split_whitespace().next())
        .unwrap_or(DEFAULT_REGION)
        .to_string();

    let tokens_in = word_count(prompt);
    let tokens_saved = eco_f64(eco_stats, "tokens_saved")
        .filter(|n| *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0);
    let original_tokens = tokens_in + tokens_saved;
    let compression_ratio = if tokens_in > 0 && original_tokens > 0 {
        tokens_in as f64 / original_tokens as f64
    } else {
        1.0
    };

    CarbonMeta {
        cfe_percent: cfe_percent(&region),
        model,
        region,
        cost_g,
        baseline_g,
        saved_g,
        cached,
        cache_hit_tokens: if cached { tokens_in } else { 0 },
        compressed: tokens_saved > 0,
        compression_ratio,
        original_tokens,
        compressed_tokens: tokens_in,
        tokens_in,
        tokens_out: word_count(response),
        latency_ms: 0,
    }
}

/// Canned reply used when the backend can't be reached
pub fn offline_reply(prompt: &str) -> String {
    let lower = prompt.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if lower.len() < 15 || has(&["hello", "hey"]) {
        "Hello! I'm running offline right now, so this turn used no compute. Ask again once the orchestrator is back for a routed answer.".to_string()
    } else if has(&["carbon", "energy", "emission", "green", "sustain"]) {
        "The orchestrator is offline. When it's up, prompts are routed to the region with the highest carbon-free energy share and served from cache when possible.".to_string()
    } else if has(&["code", "function", "python", "script", "build", "implement"]) {
        "The orchestrator is offline so I can't generate code right now. Try again in a moment.".to_string()
    } else {
        "The orchestrator is offline. Your prompt was saved to this conversation, try sending it again shortly.".to_string()
    }
}

#[derive(Clone, Serialize, Debug)]
pub struct ChatTurn {
    pub user: StoredMessage,
    pub assistant: StoredMessage,
    /// The backend queued the prompt instead of answering it
    pub deferred: bool,
    /// The reply came from the backend rather than the offline fallback
    pub live: bool,
}

/// Run one chat turn against the orchestrator and record both sides of
/// it in the ledger. Backend failures produce a local reply with zero
/// cost rather than an error.
pub async fn send_turn(
    db: &Connection,
    client: &OrchestratorClient,
    user_id: &str,
    chat_id: &str,
    prompt: &str,
    energy: &EnergyState,
) -> Result<ChatTurn> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(anyhow!("Prompt is empty"));
    }

    if find_chat_by_id(db, chat_id).await?.is_none() {
        create_chat(db, &ChatRecord::new(chat_id)).await?;
    }

    let user = StoredMessage::user(chat_id, prompt);
    append_message(db, &user).await;
    record_prompt(db, chat_id, prompt).await?;

    let req = OrchestrateRequest {
        prompt: prompt.to_string(),
        user_id: user_id.to_string(),
        project_id: chat_id.to_string(),
        bypass_eco: energy.bypass_eco().then_some(true),
        ..Default::default()
    };

    let start = Instant::now();
    let (content, carbon, deferred, live) = match client.orchestrate(&req).await {
        Ok(resp) if resp.deferred => {
            let latency_ms = start.elapsed().as_millis() as u64;
            tracing::info!("Prompt for chat {} deferred as task {:?}", chat_id, resp.task_id);
            (
                DEFERRED_NOTICE.to_string(),
                CarbonMeta::fallback(latency_ms),
                true,
                true,
            )
        }
        Ok(resp) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            let receipt = if resp.receipt_id.is_empty() {
                None
            } else {
                client
                    .receipt(&resp.receipt_id)
                    .await
                    .inspect_err(|e| tracing::debug!("Receipt {} unavailable: {}", resp.receipt_id, e))
                    .ok()
            };
            let eco_stats = resp.eco_stats.unwrap_or_default();
            let mut carbon =
                carbon_meta_from_backend(&eco_stats, receipt.as_ref(), prompt, &resp.response);
            carbon.latency_ms = latency_ms;
            (resp.response, carbon, false, true)
        }
        Err(e) => {
            tracing::warn!("Orchestrator unavailable, answering offline: {}", e);
            let latency_ms = start.elapsed().as_millis() as u64;
            (
                offline_reply(prompt),
                CarbonMeta::fallback(latency_ms),
                false,
                false,
            )
        }
    };

    let assistant = StoredMessage::assistant(chat_id, &content, carbon);
    append_message(db, &assistant).await;
    // Replies that never reached a model keep the chat on auto routing
    let or_auto = |s: &str| if s.is_empty() { "auto".to_string() } else { s.to_string() };
    record_response(
        db,
        chat_id,
        assistant.carbon.saved_g,
        &or_auto(&assistant.carbon.model),
        &or_auto(&assistant.carbon.region),
    )
    .await?;

    Ok(ChatTurn {
        user,
        assistant,
        deferred,
        live,
    })
}
