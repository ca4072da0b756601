//! Request and response records of the orchestrator HTTP API

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct OrchestrateRequest {
    pub prompt: String,
    pub user_id: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_urgent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_eco: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    Hash,
    Semantic,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct OrchestrateResponse {
    pub status: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub receipt_id: String,
    #[serde(default)]
    pub deferred: bool,
    pub task_id: Option<String>,
    pub message: Option<String>,
    pub eco_stats: Option<HashMap<String, Value>>,
    pub was_cached: Option<bool>,
    pub cache_type: Option<CacheType>,
    pub input_tokens: Option<u64>,
    pub compressed_text_tokens: Option<u64>,
    pub compressed_prompt: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GridRegion {
    #[serde(alias = "zone")]
    pub name: String,
    pub score: f64,
    pub carbon_intensity_g_per_kwh: Option<f64>,
    #[serde(default)]
    pub breakdown: HashMap<String, f64>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GridMapResponse {
    pub regions: Vec<GridRegion>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct UserSummary {
    pub chat_ids: Vec<String>,
    pub project_ids: Vec<String>,
    pub pending_tasks_count: u64,
    pub total_user_savings_g: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub receipt_id: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ChatHistory {
    pub messages: Vec<HistoryMessage>,
    pub total_chat_co2_saved_g: f64,
    pub efficiency_score: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Receipt {
    pub timestamp: String,
    pub server_location: String,
    pub model_used: String,
    pub baseline_co2_est: f64,
    pub actual_co2: f64,
    pub net_savings: f64,
    pub was_cached: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NutritionLabel {
    pub energy_kwh: f64,
    pub grid_source: HashMap<String, f64>,
    pub og_co2: f64,
    pub end_co2: f64,
    pub net_savings: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct BudgetStatus {
    pub limit_g: f64,
    pub used_g: f64,
    pub remaining_percent: f64,
    pub policy_active: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LeaderboardEntry {
    pub name: String,
    pub saved_kg: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Leaderboard {
    pub rankings: Vec<LeaderboardEntry>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PromptAnalysis {
    pub score: f64,
    pub suggestions: Vec<String>,
    pub potential_co2_savings: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct BypassResponse {
    pub response: String,
    pub warning: String,
    pub potential_savings_lost: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DeferredExecution {
    pub status: String,
    pub new_eta: String,
    pub current_grid_intensity: f64,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ProjectRequest {
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub carbon_limit_g: f64,
    pub prompt: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct StepPlan {
    pub step_number: u32,
    pub title: String,
    pub prompt: String,
    pub description: String,
    pub model_choice: String,
    pub scheduled_window: String,
    pub estimated_carbon_g: f64,
    pub estimated_tokens: u64,
    pub reasoning: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ProjectPlan {
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub carbon_limit_g: f64,
    pub prompt: String,
    pub status: String,
    pub total_estimated_carbon_g: f64,
    pub total_savings_g: f64,
    pub steps: Vec<StepPlan>,
    pub inner_monologue: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ExecuteStepRequest {
    pub prompt: String,
    pub model_choice: String,
    pub step_number: u32,
    pub title: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ExecuteStepResponse {
    pub step_number: u32,
    pub title: String,
    pub model_used: String,
    pub output: String,
    pub elapsed_ms: u64,
    pub estimated_carbon_g: f64,
    pub executed_at: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ForecastPoint {
    pub hour: String,
    /// "high", "optimal", "medium" or anything else the backend sends
    pub intensity: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ForecastResponse {
    pub current_best_model: String,
    pub reason: String,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct OracleRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency_level: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct OracleResponse {
    pub model_id: String,
    pub reason: Option<String>,
}
