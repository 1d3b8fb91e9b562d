//! MetaTrader 5 bridge client
//!
//! Talks to an HTTP proxy sitting in front of an MT5 terminal. Every route
//! is a JSON POST and answers with either `{"result": ...}` or
//! `{"error": "..."}`. Raw MT5 field names are mapped onto the bot's types.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::types::{AccountSummary, OpenTrade, TradeSide};

/// Standard bridge response wrapper
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BridgeResponse<T> {
    Success { result: T },
    Error { error: String },
}

/// `account_info` as returned by the terminal
#[derive(Debug, Deserialize)]
struct RawAccountInfo {
    login: Option<u64>,
    balance: f64,
    equity: f64,
    #[serde(default)]
    margin: f64,
    margin_free: f64,
    currency: String,
    server: Option<String>,
    leverage: Option<u32>,
}

/// One entry of `positions_get`
#[derive(Debug, Deserialize)]
struct RawPosition {
    ticket: u64,
    symbol: String,
    #[serde(rename = "type")]
    position_type: u8,
    volume: f64,
    price_open: f64,
    price_current: f64,
    #[serde(default)]
    profit: f64,
    /// Unix seconds
    time: Option<i64>,
}

/// HTTP client for the MT5 bridge
#[derive(Clone)]
pub struct MetaTraderBridge {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl MetaTraderBridge {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the account summary, counting open positions separately
    pub async fn account_info(&self) -> Result<(AccountSummary, Vec<OpenTrade>)> {
        let raw: RawAccountInfo = self.post("/api/account_info", serde_json::json!({})).await?;
        let positions = self.positions().await?;

        let summary = AccountSummary {
            equity: raw.equity,
            balance: raw.balance,
            margin: raw.margin,
            margin_free: raw.margin_free,
            open_positions: positions.len(),
            currency: raw.currency,
            login: raw.login,
            server: raw.server,
            leverage: raw.leverage,
        };

        Ok((summary, positions))
    }

    /// Fetch all open positions on the account
    pub async fn positions(&self) -> Result<Vec<OpenTrade>> {
        let raw: Vec<RawPosition> = self.post("/api/positions_get", serde_json::json!({})).await?;

        raw.into_iter().map(OpenTrade::try_from).collect()
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EngineError::Bridge(format!("{} {} - {}", path, status, text)));
        }

        let parsed: BridgeResponse<T> = response
            .json()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("{}: {}", path, e)))?;

        match parsed {
            BridgeResponse::Success { result } => Ok(result),
            BridgeResponse::Error { error } => Err(EngineError::Bridge(error)),
        }
    }
}

impl TryFrom<RawPosition> for OpenTrade {
    type Error = EngineError;

    fn try_from(raw: RawPosition) -> Result<Self> {
        let side = match raw.position_type {
            0 => TradeSide::Buy,
            1 => TradeSide::Sell,
            other => {
                return Err(EngineError::InvalidResponse(format!(
                    "position {} has unknown type {}",
                    raw.ticket, other
                )))
            }
        };

        Ok(OpenTrade {
            ticket: raw.ticket,
            symbol: raw.symbol,
            side,
            volume: raw.volume,
            open_price: raw.price_open,
            current_price: raw.price_current,
            profit: raw.profit,
            opened_at: raw.time.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        })
    }
}
