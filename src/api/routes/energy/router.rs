//! Router for eco mode and model routing

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use super::public;
use crate::api::state::AppState;
use crate::energy::EnergyState;

type SharedState = Arc<RwLock<AppState>>;

async fn get_energy(State(state): State<SharedState>) -> Json<EnergyState> {
    Json(state.read().expect("Unable to read share state").energy.clone())
}

/// Apply a partial update. The mode is applied before the model so a
/// request carrying both ends up in the state the model implies.
async fn update_energy(
    State(state): State<SharedState>,
    Json(payload): Json<public::EnergyUpdate>,
) -> Json<EnergyState> {
    let mut shared_state = state.write().expect("Unable to write share state");
    let energy = &mut shared_state.energy;

    if let Some(on) = payload.eco_mode {
        energy.set_eco(on);
    }
    if let Some(mode) = payload.mode {
        energy.set_mode(mode);
    }
    if let Some(model) = payload.selected_model {
        energy.select_model(model);
    }
    tracing::debug!("Energy state is now {:?}", energy);

    Json(energy.clone())
}

async fn reset_energy(State(state): State<SharedState>) -> Json<EnergyState> {
    let mut shared_state = state.write().expect("Unable to write share state");
    shared_state.energy.reset();
    Json(shared_state.energy.clone())
}

/// Create the energy router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_energy).post(update_energy))
        .route("/reset", post(reset_energy))
}
