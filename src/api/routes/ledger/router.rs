//! Router for the ledger API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_extra::extract::Query;
use uuid::Uuid;

use super::public;
use crate::api::state::AppState;
use crate::ledger::db::{
    clear_messages, create_chat, delete_chat, find_all_chats, find_chat_by_id,
    find_messages_by_chat_id, insert_message, load_messages,
};
use crate::ledger::format::ticker_lines;
use crate::ledger::gamification::{UserProgress, badges_for};
use crate::ledger::models::{CarbonMeta, ChatRecord, StoredMessage};
use crate::ledger::{AggregationScope, build_cache_timeline, compute_aggregate_stats};

type SharedState = Arc<RwLock<AppState>>;

/// List stored messages in append order
async fn list_messages(
    State(state): State<SharedState>,
    Query(params): Query<public::ChatScopeQuery>,
) -> Json<Vec<StoredMessage>> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let scope = AggregationScope::from_chat_id(params.chat_id);
    Json(load_messages(&db, &scope).await)
}

/// Append a message, rejecting carbon records that break the ledger
/// invariants
async fn append_message(
    State(state): State<SharedState>,
    Json(payload): Json<public::NewMessageRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    if payload.chat_id.trim().is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "chat_id is required".to_string()).into_response());
    }

    let carbon = payload
        .carbon
        .unwrap_or_else(|| CarbonMeta::for_user_prompt(&payload.content));
    if let Err(e) = carbon.validate() {
        return Ok((StatusCode::BAD_REQUEST, e.to_string()).into_response());
    }

    let msg = StoredMessage::new(&payload.chat_id, payload.role, &payload.content, carbon);
    insert_message(&db, &msg).await?;

    Ok((StatusCode::CREATED, Json(msg)).into_response())
}

/// Remove every message and chat
async fn clear_ledger(
    State(state): State<SharedState>,
) -> Result<StatusCode, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    clear_messages(&db).await?;
    tracing::info!("Cleared the ledger");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_chats(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ChatRecord>>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    Ok(Json(find_all_chats(&db).await?))
}

async fn new_chat(
    State(state): State<SharedState>,
    Json(payload): Json<public::NewChatRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    let id = payload
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut chat = ChatRecord::new(&id);
    if let Some(title) = payload.title.filter(|t| !t.trim().is_empty()) {
        chat.title = title;
    }
    create_chat(&db, &chat).await?;

    // Creating an existing chat is a no-op so return what's stored
    let chat = find_chat_by_id(&db, &id).await?.unwrap_or(chat);
    Ok((StatusCode::CREATED, Json(chat)))
}

async fn chat_detail(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    let Some(chat) = find_chat_by_id(&db, &id).await? else {
        return Ok((StatusCode::NOT_FOUND, format!("Chat {} not found", id)).into_response());
    };
    let messages = find_messages_by_chat_id(&db, &id).await?;

    Ok(Json(public::ChatDetailResponse { chat, messages }).into_response())
}

async fn remove_chat(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    if delete_chat(&db, &id).await? {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((StatusCode::NOT_FOUND, format!("Chat {} not found", id)).into_response())
    }
}

/// Aggregate statistics plus the ticker lines shown with them
async fn stats(
    State(state): State<SharedState>,
    Query(params): Query<public::StatsQuery>,
) -> Json<public::StatsResponse> {
    let (db, snapshot) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), Arc::clone(&shared_state.stats))
    };

    let stats = if params.live && params.chat_id.is_none() {
        snapshot
            .read()
            .expect("Unable to read stats snapshot")
            .clone()
    } else {
        let scope = AggregationScope::from_chat_id(params.chat_id);
        compute_aggregate_stats(&load_messages(&db, &scope).await)
    };
    let ticker = ticker_lines(&stats);

    Json(public::StatsResponse { stats, ticker })
}

async fn timeline(
    State(state): State<SharedState>,
    Path(chat_id): Path<String>,
) -> Json<crate::ledger::models::CacheTimeline> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let messages = load_messages(&db, &AggregationScope::Conversation(chat_id)).await;
    Json(build_cache_timeline(&messages))
}

/// Sustainability score and badge progress for everything in the ledger
async fn score(
    State(state): State<SharedState>,
    Query(params): Query<public::ScoreQuery>,
) -> Json<public::ScoreResponse> {
    let (db, eco_mode) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), shared_state.energy.eco_mode)
    };
    let eco_mode_percent = params
        .eco_mode_percent
        .unwrap_or(if eco_mode { 100.0 } else { 0.0 });

    let messages = load_messages(&db, &AggregationScope::AllConversations).await;
    let stats = compute_aggregate_stats(&messages);
    let progress = UserProgress::from_ledger(&stats, &messages, eco_mode_percent);

    Json(public::ScoreResponse {
        score: progress.sustainability_score(),
        badges: badges_for(&progress),
    })
}

/// Create the ledger router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/messages",
            get(list_messages).post(append_message).delete(clear_ledger),
        )
        .route("/chats", get(list_chats).post(new_chat))
        .route("/chats/{id}", get(chat_detail).delete(remove_chat))
        .route("/stats", get(stats))
        .route("/timeline/{chat_id}", get(timeline))
        .route("/score", get(score))
}
