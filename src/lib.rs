pub mod api;
pub mod cli;
pub mod core;
pub mod energy;
pub mod jobs;
pub mod ledger;
pub mod orchestrator;
