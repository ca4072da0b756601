//! Router for persisted UI preferences

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, routing::get};
use axum_extra::extract::Query;

use super::public;
use crate::api::state::AppState;
use crate::ledger::db::{
    has_title_animated, is_sidebar_collapsed, mark_title_animated, set_sidebar_collapsed,
};

type SharedState = Arc<RwLock<AppState>>;

async fn get_sidebar(
    State(state): State<SharedState>,
) -> Result<Json<public::SidebarPreference>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let collapsed = is_sidebar_collapsed(&db).await?;
    Ok(Json(public::SidebarPreference { collapsed }))
}

async fn set_sidebar(
    State(state): State<SharedState>,
    Json(payload): Json<public::SidebarPreference>,
) -> Result<Json<public::SidebarPreference>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    set_sidebar_collapsed(&db, payload.collapsed).await?;
    Ok(Json(payload))
}

/// Whether a chat title has already played its reveal animation
async fn get_title_animated(
    State(state): State<SharedState>,
    Query(params): Query<public::TitleQuery>,
) -> Result<Json<public::TitleAnimatedResponse>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let animated = has_title_animated(&db, &params.title).await?;
    Ok(Json(public::TitleAnimatedResponse {
        title: params.title,
        animated,
    }))
}

async fn set_title_animated(
    State(state): State<SharedState>,
    Json(payload): Json<public::TitleAnimatedRequest>,
) -> Result<Json<public::TitleAnimatedResponse>, crate::api::public::ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    mark_title_animated(&db, &payload.title).await?;
    Ok(Json(public::TitleAnimatedResponse {
        title: payload.title,
        animated: true,
    }))
}

/// Create the preferences router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sidebar", get(get_sidebar).post(set_sidebar))
        .route(
            "/title-animated",
            get(get_title_animated).post(set_title_animated),
        )
}
