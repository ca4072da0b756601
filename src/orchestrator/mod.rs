//! Client for the carbon-aware orchestrator backend

mod client;
mod error;
pub mod grid;
pub mod models;
pub mod voice;

pub use client::OrchestratorClient;
pub use error::OrchestratorError;
