//! Public types for the chat API

use serde::Deserialize;

pub use crate::ledger::chat::ChatTurn;

#[derive(Deserialize)]
pub struct ChatRequest {
    /// A new chat is started when absent
    pub chat_id: Option<String>,
    pub prompt: String,
}
