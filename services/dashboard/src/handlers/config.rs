//! Configuration handlers

use axum::{body::Bytes, extract::State, Json};
use forex_engine::{parse_config, BotConfig, ConfigIssue};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config: BotConfig,
}

/// GET /api/config - Active configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        config: state.store.config().await,
    })
}

/// POST /api/config - Validate and replace the configuration
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ConfigResponse>, ApiError> {
    let document: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        ApiError::InvalidConfig(vec![ConfigIssue {
            path: Vec::new(),
            code: "invalid_type".to_string(),
            message: e.to_string(),
        }])
    })?;

    let config = parse_config(document).map_err(ApiError::InvalidConfig)?;

    let bot_state = state.store.set_config(config).await;
    info!(
        symbols = bot_state.config.symbols.len(),
        "Bot configuration updated"
    );

    Ok(Json(ConfigResponse {
        config: bot_state.config,
    }))
}
