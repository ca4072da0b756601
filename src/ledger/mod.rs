//! Local carbon ledger: stored chat turns and the views derived from them

pub mod chat;
pub mod db;
pub mod format;
pub mod gamification;
pub mod models;
pub mod seed;
mod stats;
mod timeline;

pub use stats::{AggregationScope, compute_aggregate_stats};
pub use timeline::build_cache_timeline;
