//! Router for short spoken answers

use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use super::public;
use crate::api::state::AppState;
use crate::orchestrator::voice::{last_user_message, voice_response};

type SharedState = Arc<RwLock<AppState>>;

async fn voice_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::VoiceRequest>,
) -> impl IntoResponse {
    let Some(messages) = payload.messages else {
        return (StatusCode::BAD_REQUEST, "messages required").into_response();
    };
    if last_user_message(&messages).is_none() {
        return (StatusCode::BAD_REQUEST, "no user message").into_response();
    }

    let (client, timeout) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.client.clone(),
            Duration::from_millis(shared_state.config.voice_timeout_ms),
        )
    };

    let response = voice_response(&client, &messages, timeout).await;
    Json(public::VoiceResponse { response }).into_response()
}

/// Create the voice router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(voice_handler))
}
