//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use super::public;
use crate::api::state::AppState;
use crate::ledger::chat::send_turn;

type SharedState = Arc<RwLock<AppState>>;

/// Run one chat turn and return both stored messages
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::ChatRequest>,
) -> Result<impl IntoResponse, crate::api::public::ApiError> {
    if payload.prompt.trim().is_empty() {
        return Ok((StatusCode::BAD_REQUEST, "prompt is required").into_response());
    }

    let (db, client, user_id, energy) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.db.clone(),
            shared_state.client.clone(),
            shared_state.config.user_id.clone(),
            shared_state.energy.clone(),
        )
    };
    let chat_id = payload
        .chat_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let turn = send_turn(&db, &client, &user_id, &chat_id, &payload.prompt, &energy).await?;
    Ok(Json(turn).into_response())
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
