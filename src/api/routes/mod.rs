//! API routes module

pub mod chat;
pub mod energy;
mod grid;
pub mod ledger;
pub mod prefs;
pub mod voice;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Stored messages, chats and the views derived from them
        .nest("/ledger", ledger::router())
        // Persisted UI preferences
        .nest("/prefs", prefs::router())
        // Eco mode and model routing
        .nest("/energy", energy::router())
        // Short spoken answers
        .nest("/voice-response", voice::router())
        // Grid carbon intensity
        .nest("/grid", grid::router())
        // Full chat turns
        .nest("/chat", chat::router())
}
