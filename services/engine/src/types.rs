//! Bot state and configuration model
//!
//! Everything here is serialized with camelCase keys because the same JSON
//! is served to the dashboard and written to the state file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Runtime state of the trading bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotState {
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default)]
    pub open_trades: Vec<OpenTrade>,
    pub config: BotConfig,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            running: false,
            last_run: None,
            last_error: None,
            open_trades: Vec::new(),
            config: BotConfig::default(),
        }
    }
}

/// Account-wide risk limits plus the traded symbol universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    #[validate(length(min = 1))]
    pub symbols: Vec<SymbolConfig>,
    #[validate(range(min = 1.0, max = 20.0))]
    pub max_daily_loss_percent: f64,
    #[validate(range(min = 5.0, max = 50.0))]
    pub max_drawdown_percent: f64,
    #[validate(range(min = 1.0, max = 100.0))]
    pub max_total_exposure_percent: f64,
    #[validate(range(min = 1.0, max = 240.0))]
    pub trade_cooldown_minutes: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbols: ["EURUSD", "GBPUSD", "USDJPY"]
                .into_iter()
                .map(SymbolConfig::with_defaults)
                .collect(),
            max_daily_loss_percent: 5.0,
            max_drawdown_percent: 15.0,
            max_total_exposure_percent: 30.0,
            trade_cooldown_minutes: 30.0,
        }
    }
}

impl BotConfig {
    /// Look up the configuration of a traded symbol
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolConfig> {
        self.symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// Per-symbol trading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SymbolConfig {
    #[validate(length(min = 1))]
    pub symbol: String,
    #[validate(length(min = 1))]
    pub timeframe: String,
    #[validate(range(min = 1.0, max = 10.0))]
    pub max_simultaneous_trades: f64,
    /// Fraction of equity risked per trade (0.01 = 1%)
    #[validate(range(min = 0.001, max = 0.05))]
    pub risk_per_trade: f64,
    #[validate(range(min = 0.1, max = 1.0))]
    pub min_confidence: f64,
}

impl SymbolConfig {
    pub fn with_defaults(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: "M15".to_string(),
            max_simultaneous_trades: 2.0,
            risk_per_trade: 0.01,
            min_confidence: 0.65,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Open position held on the broker account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTrade {
    pub ticket: u64,
    pub symbol: String,
    pub side: TradeSide,
    pub volume: f64,
    pub open_price: f64,
    pub current_price: f64,
    pub profit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<DateTime<Utc>>,
}

/// Broker account snapshot shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub equity: f64,
    pub balance: f64,
    pub margin: f64,
    pub margin_free: f64,
    pub open_positions: usize,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage: Option<u32>,
}
