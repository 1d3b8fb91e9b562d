//! Account handler

use axum::{extract::State, Json};
use forex_engine::{AccountSummary, BotState};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account: Option<AccountSummary>,
    pub state: BotState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/account - Broker account plus bot state
///
/// Broker failures degrade to `account: null` with a 200 so the dashboard
/// keeps rendering the bot state.
pub async fn get_account(State(state): State<Arc<AppState>>) -> Json<AccountResponse> {
    let (account, error) = match state.engine().account_summary().await {
        Ok(account) => (Some(account), None),
        Err(e) => {
            warn!(error = %e, "Account lookup failed");
            (None, Some(e.to_string()))
        }
    };

    Json(AccountResponse {
        account,
        state: state.store.snapshot().await,
        error,
    })
}
