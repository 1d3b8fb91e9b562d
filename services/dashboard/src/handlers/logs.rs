//! Execution log feed

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{AppState, LogEntry};

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// GET /api/logs - Recent log entries, newest first
///
/// An unparseable `limit` falls back to the default.
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Json<LogsResponse> {
    let query = query.map(|Query(q)| q).unwrap_or_else(|e| {
        debug!(error = %e, "Ignoring malformed logs query");
        LogsQuery::default()
    });
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .min(state.logs.capacity());

    Json(LogsResponse {
        logs: state.logs.recent(limit),
    })
}
