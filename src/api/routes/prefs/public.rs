//! Public types for the preferences API

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct SidebarPreference {
    pub collapsed: bool,
}

#[derive(Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

#[derive(Serialize, Deserialize)]
pub struct TitleAnimatedRequest {
    pub title: String,
}

#[derive(Serialize, Deserialize)]
pub struct TitleAnimatedResponse {
    pub title: String,
    pub animated: bool,
}
