//! Trading engine seam
//!
//! Routes and the scheduler only see `TradingEngine`. Signal generation and
//! order execution sit behind it; the MetaTrader engine here keeps the bot
//! state in sync with the broker account on every cycle.

use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::bridge::MetaTraderBridge;
use crate::error::Result;
use crate::state::BotStateStore;
use crate::types::{AccountSummary, BotConfig, BotState, OpenTrade};

#[async_trait::async_trait]
pub trait TradingEngine: Send + Sync {
    /// Engine name for logs and health output
    fn name(&self) -> &str;

    /// Current broker account snapshot
    async fn account_summary(&self) -> Result<AccountSummary>;

    /// Run one decision/execution step and return the updated state
    async fn run_cycle(&self, store: &BotStateStore) -> Result<BotState>;
}

/// Engine backed by a MetaTrader 5 bridge
pub struct MetaTraderEngine {
    bridge: MetaTraderBridge,
}

impl MetaTraderEngine {
    pub fn new(bridge: MetaTraderBridge) -> Self {
        Self { bridge }
    }
}

#[async_trait::async_trait]
impl TradingEngine for MetaTraderEngine {
    fn name(&self) -> &str {
        "metatrader"
    }

    async fn account_summary(&self) -> Result<AccountSummary> {
        let (summary, _) = self.bridge.account_info().await?;
        Ok(summary)
    }

    async fn run_cycle(&self, store: &BotStateStore) -> Result<BotState> {
        let config = store.config().await;
        let (account, positions) = self.bridge.account_info().await?;

        debug!(
            equity = account.equity,
            margin_free = account.margin_free,
            positions = positions.len(),
            "Account snapshot"
        );

        let trades = managed_trades(&config, positions);
        warn_over_limit(&config, &trades);

        let state = store
            .update(|state| {
                state.open_trades = trades;
                state.last_run = Some(Utc::now());
                state.last_error = None;
            })
            .await;

        info!(
            open_trades = state.open_trades.len(),
            equity = account.equity,
            currency = %account.currency,
            "Cycle synced with account"
        );

        Ok(state)
    }
}

/// Keep only positions on symbols the bot trades
pub fn managed_trades(config: &BotConfig, positions: Vec<OpenTrade>) -> Vec<OpenTrade> {
    positions
        .into_iter()
        .filter(|p| config.symbol(&p.symbol).is_some())
        .collect()
}

fn warn_over_limit(config: &BotConfig, trades: &[OpenTrade]) {
    let mut per_symbol: HashMap<String, u32> = HashMap::new();
    for trade in trades {
        *per_symbol.entry(trade.symbol.to_uppercase()).or_insert(0) += 1;
    }

    for (symbol, count) in per_symbol {
        if let Some(limit) = config.symbol(&symbol).map(|s| s.max_simultaneous_trades) {
            if f64::from(count) > limit {
                warn!(symbol = %symbol, open = count, limit, "Symbol holds more trades than allowed");
            }
        }
    }
}
