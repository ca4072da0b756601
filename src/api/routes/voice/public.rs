//! Public types for the voice API

use serde::{Deserialize, Serialize};

use crate::orchestrator::voice::VoiceMessage;

#[derive(Deserialize)]
pub struct VoiceRequest {
    pub messages: Option<Vec<VoiceMessage>>,
}

/// `response` is null when the backend had nothing to say in time and
/// the caller should answer on its own
#[derive(Serialize, Deserialize)]
pub struct VoiceResponse {
    pub response: Option<String>,
}
