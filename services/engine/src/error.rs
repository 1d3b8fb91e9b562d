//! Error types for the trading engine

/// Errors raised by the engine, the bridge client and the state store
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("MetaTrader bridge error: {0}")]
    Bridge(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
