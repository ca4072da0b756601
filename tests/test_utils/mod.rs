//! Test utilities for integration tests
use std::fs;
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use sorcer::api::AppState;
use sorcer::api::app;
use sorcer::core::AppConfig;
use sorcer::core::db::{async_db, setup_db};
use sorcer::ledger::AggregationScope;

/// Nothing listens here so backend calls fail fast
pub const OFFLINE_BACKEND: &str = "http://127.0.0.1:9";

/// Creates a test application router backed by a fresh database in a
/// temporary directory, talking to an unreachable backend.
pub async fn test_app() -> Router {
    test_app_with_backend(OFFLINE_BACKEND).await
}

/// Same as `test_app` but talking to the backend at `backend_url`,
/// typically a `mockito` server.
pub async fn test_app_with_backend(backend_url: &str) -> Router {
    // The directory must outlive the router so it is never cleaned up
    let dir = tempfile::tempdir()
        .expect("Failed to create temp directory")
        .keep();
    let db_path = dir.join("db");
    fs::create_dir_all(&db_path).expect("Failed to create db directory");

    let app_config = AppConfig {
        storage_path: dir.display().to_string(),
        db_path: db_path.display().to_string(),
        backend_url: backend_url.to_string(),
        user_id: String::from("test-user"),
        voice_timeout_ms: 2000,
        stats_interval_secs: 3,
        stats_scope: AggregationScope::AllConversations,
    };

    let db = async_db(&app_config.db_file())
        .await
        .expect("Failed to connect to async db");
    setup_db(&db).await.expect("Failed to initialize db");

    let app_state = AppState::new(db, app_config);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}
