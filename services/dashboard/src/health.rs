//! Health check endpoints for load balancers and monitoring

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Basic health check - fast, no external dependencies
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Detailed status for debugging; never calls the broker
pub async fn health_detail(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let bot = state.store.snapshot().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine().name().to_string(),
        running: bot.running,
        last_run: bot.last_run,
        last_error: bot.last_error,
        persistent_state: state.store.is_persistent(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        log_entries: state.logs.len(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub persistent_state: bool,
    pub uptime_secs: u64,
    pub log_entries: usize,
}
