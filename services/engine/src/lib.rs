//! Forex Engine Library
//!
//! Bot state, configuration model and the trading engine seam used by the
//! dashboard service.

pub mod bridge;
pub mod engine;
pub mod error;
pub mod runner;
pub mod state;
pub mod types;
pub mod validation;

// Re-export main types for convenience
pub use bridge::MetaTraderBridge;
pub use engine::{MetaTraderEngine, TradingEngine};
pub use error::{EngineError, Result};
pub use runner::{CycleOutcome, CycleRunner, CycleTrigger};
pub use state::BotStateStore;
pub use types::{AccountSummary, BotConfig, BotState, OpenTrade, SymbolConfig, TradeSide};
pub use validation::{parse_config, ConfigIssue, PathSegment};
