use std::time::Duration;

use http::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::OrchestratorError;
use super::models::*;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Typed wrapper around the orchestrator's JSON API
#[derive(Clone, Debug)]
pub struct OrchestratorClient {
    base_url: String,
    http: reqwest::Client,
}

impl OrchestratorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                body
            };
            return Err(OrchestratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Every call is JSON, including the ones without a body
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(CONTENT_TYPE, "application/json")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::POST, path)).await
    }

    // Discovery

    pub async fn user_summary(&self, user_id: &str) -> Result<UserSummary> {
        self.get(&format!("/user/{}/summary", urlencoding::encode(user_id)))
            .await
    }

    pub async fn chat_history(&self, chat_id: &str) -> Result<ChatHistory> {
        self.get(&format!("/chat/{}/history", urlencoding::encode(chat_id)))
            .await
    }

    // Action

    pub async fn orchestrate(&self, req: &OrchestrateRequest) -> Result<OrchestrateResponse> {
        self.post("/orchestrate", req).await
    }

    /// Same as `orchestrate` but the request is abandoned after `timeout`
    pub async fn orchestrate_with_timeout(
        &self,
        req: &OrchestrateRequest,
        timeout: Duration,
    ) -> Result<OrchestrateResponse> {
        self.send(
            self.request(Method::POST, "/orchestrate")
                .timeout(timeout)
                .json(req),
        )
        .await
    }

    pub async fn execute_deferred(&self, task_id: &str) -> Result<DeferredExecution> {
        self.post_empty(&format!(
            "/deferred/execute/{}",
            urlencoding::encode(task_id)
        ))
        .await
    }

    pub async fn bypass(&self, prompt: &str) -> Result<BypassResponse> {
        self.post(
            "/bypass",
            &PromptRequest {
                prompt: prompt.to_string(),
            },
        )
        .await
    }

    // Transparency

    pub async fn receipt(&self, receipt_id: &str) -> Result<Receipt> {
        self.get(&format!("/receipt/{}", urlencoding::encode(receipt_id)))
            .await
    }

    pub async fn nutrition_label(&self, receipt_id: &str) -> Result<NutritionLabel> {
        self.get(&format!(
            "/analytics/nutrition/{}",
            urlencoding::encode(receipt_id)
        ))
        .await
    }

    // Intelligence

    pub async fn analyze_prompt(&self, prompt: &str) -> Result<PromptAnalysis> {
        self.post(
            "/analyze/prompt",
            &PromptRequest {
                prompt: prompt.to_string(),
            },
        )
        .await
    }

    pub async fn grid_map(&self) -> Result<GridMapResponse> {
        self.get("/grid/map").await
    }

    pub async fn forecast(&self) -> Result<ForecastResponse> {
        self.get("/api/forecast").await
    }

    /// Ask the oracle which model should serve a prompt. Unlike the
    /// other calls the response shape is checked strictly.
    pub async fn oracle_route(&self, req: &OracleRequest) -> Result<OracleResponse> {
        let data: Value = self.post("/api/oracle/route", req).await?;
        match data.get("model_id") {
            Some(Value::String(_)) => Ok(serde_json::from_value(data)?),
            _ => Err(OrchestratorError::MissingField("model_id")),
        }
    }

    // Governance

    pub async fn budget_status(&self, project_id: &str) -> Result<BudgetStatus> {
        self.get(&format!(
            "/budget/status/{}",
            urlencoding::encode(project_id)
        ))
        .await
    }

    pub async fn leaderboard(&self, filter: Option<&str>) -> Result<Leaderboard> {
        let query = match filter {
            Some(f) if !f.is_empty() => format!("?filter={}", urlencoding::encode(f)),
            _ => String::new(),
        };
        self.get(&format!("/leaderboard{}", query)).await
    }

    pub async fn health(&self) -> Result<Health> {
        self.get("/health").await
    }

    // Agent

    pub async fn plan_project(&self, req: &ProjectRequest) -> Result<ProjectPlan> {
        self.post("/agent/project", req).await
    }

    pub async fn execute_step(&self, req: &ExecuteStepRequest) -> Result<ExecuteStepResponse> {
        self.post("/agent/execute-step", req).await
    }
}
