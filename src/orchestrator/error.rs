use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("API {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Orchestrator response missing {0}")]
    MissingField(&'static str),
    #[error("Orchestrator request timed out")]
    Timeout,
    #[error("Orchestrator request failed: {0}")]
    Transport(reqwest::Error),
    #[error("Invalid orchestrator response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for OrchestratorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OrchestratorError::Timeout
        } else {
            OrchestratorError::Transport(err)
        }
    }
}
