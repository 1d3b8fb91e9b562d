//! Scheduler entry point

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forex_engine::{BotState, CycleOutcome, CycleTrigger};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CronResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<BotState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/cron - Run one cycle if the bot is started
///
/// Responds with `status` set to `"ok"` and the new state after a cycle,
/// `"skipped"` and the unchanged state while the bot is stopped (no cycle
/// runs), or `"error"` with a 500 when the cycle fails.
pub async fn run_cron(State(state): State<Arc<AppState>>) -> Response {
    match state.cycles.run_if_running(CycleTrigger::Cron).await {
        Ok(CycleOutcome::Completed(bot_state)) => Json(CronResponse {
            status: "ok",
            state: Some(bot_state),
            error: None,
        })
        .into_response(),
        Ok(CycleOutcome::Skipped(bot_state)) => Json(CronResponse {
            status: "skipped",
            state: Some(bot_state),
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CronResponse {
                status: "error",
                state: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
