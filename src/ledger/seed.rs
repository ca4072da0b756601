//! Demo conversations for a fresh ledger

use anyhow::Result;
use chrono::{Duration, Utc};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::db::{create_chat, find_all_chats, get_preference, insert_message, set_preference};
use super::models::{CarbonMeta, ChatRecord, Role, StoredMessage};

const SEEDED_KEY: &str = "seeded";

struct SeedTurn {
    prompt: &'static str,
    reply: &'static str,
    carbon: CarbonMeta,
}

struct SeedChat {
    title: &'static str,
    model: &'static str,
    region: &'static str,
    hours_ago: i64,
    turns: Vec<SeedTurn>,
}

#[allow(clippy::too_many_arguments)]
fn meta(
    model: &str,
    region: &str,
    cfe_percent: f64,
    cost_g: f64,
    baseline_g: f64,
    saved_g: f64,
    tokens: (u64, u64),
    latency_ms: u64,
    cache_hit_tokens: u64,
    compression: Option<(u64, u64, f64)>,
) -> CarbonMeta {
    let (tokens_in, tokens_out) = tokens;
    let (original_tokens, compressed_tokens, compression_ratio) =
        compression.unwrap_or((tokens_in, tokens_in, 1.0));
    CarbonMeta {
        model: model.to_string(),
        cost_g,
        baseline_g,
        saved_g,
        cached: cache_hit_tokens > 0,
        cache_hit_tokens,
        compressed: compression.is_some(),
        compression_ratio,
        original_tokens,
        compressed_tokens,
        tokens_in,
        tokens_out,
        latency_ms,
        region: region.to_string(),
        cfe_percent,
    }
}

fn seed_chats() -> Vec<SeedChat> {
    let flash = "google/gemini-2.5-flash-lite";
    let haiku = "anthropic/claude-haiku-4.5";
    vec![
        SeedChat {
            title: "Analyze carbon impact of cloud computing",
            model: flash,
            region: "us-central1",
            hours_ago: 2,
            turns: vec![
                SeedTurn {
                    prompt: "What's the carbon footprint of running a large language model in different cloud regions?",
                    reply: "It varies dramatically by region. us-central1 runs on 89% carbon-free energy, so a typical inference there produces about 0.12g CO₂ compared to 0.57g in a coal-heavy region.",
                    carbon: meta(flash, "us-central1", 89.0, 0.12, 0.57, 0.45, (24, 680), 890, 340, Some((24, 18, 0.72))),
                },
                SeedTurn {
                    prompt: "How does prompt caching help reduce carbon emissions specifically?",
                    reply: "A cache hit skips re-processing the matched tokens entirely. 340 of 680 tokens came from cache in your previous query, roughly halving GPU time for that turn.",
                    carbon: meta(flash, "us-central1", 89.0, 0.08, 0.52, 0.44, (14, 520), 650, 420, Some((14, 11, 0.78))),
                },
            ],
        },
        SeedChat {
            title: "Compare sustainable AI architectures",
            model: haiku,
            region: "europe-west1",
            hours_ago: 8,
            turns: vec![
                SeedTurn {
                    prompt: "Compare the energy efficiency of transformer models vs mixture-of-experts for sustainable AI deployment.",
                    reply: "Mixture-of-experts activates only a few experts per token, so inference uses roughly a quarter of the energy of a dense model of similar quality.",
                    carbon: meta(haiku, "europe-west1", 82.0, 0.31, 0.89, 0.58, (18, 890), 2100, 0, Some((18, 11, 0.58))),
                },
                SeedTurn {
                    prompt: "What about the training cost difference?",
                    reply: "Training a mixture-of-experts model costs more, but a model is trained once and queried billions of times, so the inference savings dominate.",
                    carbon: meta(haiku, "europe-west1", 82.0, 0.22, 0.78, 0.56, (8, 720), 1800, 280, None),
                },
            ],
        },
        SeedChat {
            title: "Debug memory leak in async Python",
            model: haiku,
            region: "us-central1",
            hours_ago: 26,
            turns: vec![SeedTurn {
                prompt: "I have a memory leak in my async Python FastAPI app. Memory grows by 50MB/hour under load.",
                reply: "Check for unclosed HTTP sessions and task references that are never released, then use tracemalloc snapshots to find the exact allocation site.",
                carbon: meta(haiku, "us-central1", 89.0, 0.15, 0.58, 0.43, (22, 680), 1500, 0, Some((22, 15, 0.68))),
            }],
        },
    ]
}

/// Populate the ledger with demo conversations the first time it is
/// opened. Returns the number of chats created.
pub async fn seed_if_empty(db: &Connection) -> Result<usize> {
    if get_preference(db, SEEDED_KEY).await?.is_some() {
        return Ok(0);
    }
    if !find_all_chats(db).await?.is_empty() {
        set_preference(db, SEEDED_KEY, "true").await?;
        return Ok(0);
    }

    let seeds = seed_chats();
    let count = seeds.len();
    for seed in seeds {
        let chat_id = Uuid::new_v4().to_string();
        let started = Utc::now() - Duration::hours(seed.hours_ago);

        let chat = ChatRecord {
            id: chat_id.clone(),
            title: seed.title.to_string(),
            created_at: started.to_rfc3339(),
            carbon_saved: seed.turns.iter().map(|t| t.carbon.saved_g).sum(),
            prompt_count: seed.turns.len() as u64,
            model: seed.model.to_string(),
            region: seed.region.to_string(),
        };
        create_chat(db, &chat).await?;

        for (i, turn) in seed.turns.into_iter().enumerate() {
            let at = (started + Duration::minutes(i as i64 * 2)).to_rfc3339();
            let mut prompt = StoredMessage::user(&chat_id, turn.prompt);
            prompt.created_at = at.clone();
            let mut reply = StoredMessage::new(&chat_id, Role::Assistant, turn.reply, turn.carbon);
            reply.created_at = at;
            insert_message(db, &prompt).await?;
            insert_message(db, &reply).await?;
        }
    }

    set_preference(db, SEEDED_KEY, "true").await?;
    tracing::info!("Seeded ledger with {} demo chats", count);
    Ok(count)
}
