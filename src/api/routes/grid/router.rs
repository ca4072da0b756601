//! Router for grid carbon intensity

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};

use crate::api::state::AppState;
use crate::orchestrator::grid::{GridStatus, grid_status};

type SharedState = Arc<RwLock<AppState>>;

async fn grid(State(state): State<SharedState>) -> Json<GridStatus> {
    let client = state.read().expect("Unable to read share state").client.clone();
    Json(grid_status(&client).await)
}

/// Create the grid router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(grid))
}
