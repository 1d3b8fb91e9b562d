//! Bot state store
//!
//! A single `BotState` behind an async lock, shared by every route and by
//! the cycle runner. When opened with a path the state is written back to a
//! JSON file after each mutation so a restart resumes where it left off.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::types::{BotConfig, BotState};

#[derive(Clone)]
pub struct BotStateStore {
    inner: Arc<RwLock<BotState>>,
    path: Option<PathBuf>,
}

impl BotStateStore {
    /// Volatile store starting from the default state
    pub fn in_memory() -> Self {
        Self::with_state(BotState::default())
    }

    pub fn with_state(state: BotState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
            path: None,
        }
    }

    /// Open a persisted store, restoring the previous state if the file is usable
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let state = match fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<BotState>(&raw) {
                Ok(state) => match state.config.check() {
                    Ok(()) => {
                        info!(path = %path.display(), running = state.running, "Restored bot state");
                        state
                    }
                    Err(issues) => {
                        warn!(
                            path = %path.display(),
                            issues = issues.len(),
                            "Stored config is out of bounds, restoring defaults"
                        );
                        BotState {
                            config: BotConfig::default(),
                            ..state
                        }
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "State file unreadable, starting fresh");
                    BotState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file yet");
                BotState::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
            path: Some(path),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    pub async fn snapshot(&self) -> BotState {
        self.inner.read().await.clone()
    }

    pub async fn config(&self) -> BotConfig {
        self.inner.read().await.config.clone()
    }

    /// Replace the whole state
    pub async fn set(&self, state: BotState) -> BotState {
        self.update(|current| *current = state).await
    }

    /// Replace only the configuration, keeping runtime fields
    pub async fn set_config(&self, config: BotConfig) -> BotState {
        self.update(|state| state.config = config).await
    }

    /// Apply a mutation atomically and return the resulting state
    pub async fn update<F>(&self, mutate: F) -> BotState
    where
        F: FnOnce(&mut BotState) + Send,
    {
        let mut state = self.inner.write().await;
        mutate(&mut state);
        let snapshot = state.clone();

        // Written under the lock so files never go backwards
        if let Some(path) = &self.path {
            if let Err(e) = write_state(path, &snapshot).await {
                warn!(path = %path.display(), error = %e, "Failed to persist bot state");
            }
        }

        snapshot
    }
}

impl Default for BotStateStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

async fn write_state(path: &Path, state: &BotState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), "Wrote bot state");
    Ok(())
}
