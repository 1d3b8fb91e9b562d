//! Service settings
//!
//! Loaded from defaults, an optional `dashboard.toml` next to the binary and
//! `FOREX__*` environment variables (`FOREX__BRIDGE__URL`,
//! `FOREX__CRON__SECRET`, ...). `.env` is read first.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub server: ServerSettings,
    pub bridge: BridgeSettings,
    #[serde(default)]
    pub state: StateSettings,
    pub cron: CronSettings,
    pub logs: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// MetaTrader 5 bridge connection
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeSettings {
    pub url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateSettings {
    /// JSON file holding the bot state; in-memory only when unset
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CronSettings {
    /// Bearer token required on `/api/cron` when set
    pub secret: Option<String>,
    /// In-process scheduler period, 0 disables it
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Entries kept for `/api/logs`
    pub capacity: usize,
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("bridge.url", "http://localhost:5000")?
            .set_default("bridge.timeout_secs", 15)?
            .set_default("cron.interval_secs", 0)?
            .set_default("logs.capacity", 500)?
            .add_source(File::with_name("dashboard").required(false))
            .add_source(Environment::with_prefix("FOREX").separator("__"))
            .build()?;

        let mut settings: AppSettings = config.try_deserialize()?;

        // Conventional platform variables win over everything else
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            settings.server.port = port;
        }
        if let Ok(secret) = std::env::var("CRON_SECRET") {
            settings.cron.secret = Some(secret);
        }

        settings.normalize();
        Ok(settings)
    }

    /// Treat empty strings as unset
    fn normalize(&mut self) {
        for value in [
            &mut self.bridge.token,
            &mut self.state.file,
            &mut self.cron.secret,
        ] {
            if value.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *value = None;
            }
        }
        self.logs.capacity = self.logs.capacity.max(1);
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_secs(self.bridge.timeout_secs)
    }

    pub fn scheduler_interval(&self) -> Option<Duration> {
        (self.cron.interval_secs > 0).then(|| Duration::from_secs(self.cron.interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AppSettings {
        AppSettings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            bridge: BridgeSettings {
                url: "http://bridge:5000".to_string(),
                token: Some(" ".to_string()),
                timeout_secs: 10,
            },
            state: StateSettings {
                file: Some(String::new()),
            },
            cron: CronSettings {
                secret: Some("s3cret".to_string()),
                interval_secs: 0,
            },
            logs: LogSettings { capacity: 0 },
        }
    }

    #[test]
    fn test_normalize_clears_blank_values() {
        let mut s = settings();
        s.normalize();

        assert!(s.bridge.token.is_none());
        assert!(s.state.file.is_none());
        assert_eq!(s.cron.secret.as_deref(), Some("s3cret"));
        assert_eq!(s.logs.capacity, 1);
    }

    #[test]
    fn test_scheduler_disabled_at_zero() {
        let mut s = settings();
        assert!(s.scheduler_interval().is_none());

        s.cron.interval_secs = 300;
        assert_eq!(s.scheduler_interval(), Some(Duration::from_secs(300)));
        assert_eq!(s.bind_addr(), "127.0.0.1:8080");
    }
}
