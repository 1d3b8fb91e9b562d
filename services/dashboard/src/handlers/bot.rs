//! Bot lifecycle handlers

use axum::{body::Bytes, extract::State, Json};
use forex_engine::{BotState, CycleTrigger};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotAction {
    Start,
    Stop,
    Cycle,
}

#[derive(Debug, Deserialize)]
pub struct BotActionRequest {
    pub action: BotAction,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: BotState,
}

/// GET /api/bot - Current bot state
pub async fn get_bot(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        state: state.store.snapshot().await,
    })
}

/// POST /api/bot - Start, stop or run one cycle
pub async fn bot_action(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<StateResponse>, ApiError> {
    let req: BotActionRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::UnsupportedAction)?;

    let bot_state = match req.action {
        BotAction::Start => {
            let bot_state = state
                .store
                .update(|s| {
                    s.running = true;
                    s.last_error = None;
                })
                .await;
            info!("Trading bot started");
            bot_state
        }
        BotAction::Stop => {
            let bot_state = state.store.update(|s| s.running = false).await;
            info!("Trading bot stopped");
            bot_state
        }
        BotAction::Cycle => state
            .cycles
            .run(CycleTrigger::Manual)
            .await
            .map_err(|e| ApiError::CycleFailed(e.to_string()))?,
    };

    Ok(Json(StateResponse { state: bot_state }))
}
