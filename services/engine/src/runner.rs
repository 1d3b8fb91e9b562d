//! Cycle runner - dispatches engine cycles from routes, cron and the scheduler

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::TradingEngine;
use crate::error::Result;
use crate::state::BotStateStore;
use crate::types::BotState;

/// What asked for a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    Manual,
    Cron,
    Scheduler,
}

impl CycleTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleTrigger::Manual => "manual",
            CycleTrigger::Cron => "cron",
            CycleTrigger::Scheduler => "scheduler",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(BotState),
    /// Bot is stopped, nothing ran
    Skipped(BotState),
}

/// Runs one cycle at a time against the shared state
#[derive(Clone)]
pub struct CycleRunner {
    engine: Arc<dyn TradingEngine>,
    store: BotStateStore,
    gate: Arc<Mutex<()>>,
}

impl CycleRunner {
    pub fn new(engine: Arc<dyn TradingEngine>, store: BotStateStore) -> Self {
        Self {
            engine,
            store,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn engine(&self) -> &Arc<dyn TradingEngine> {
        &self.engine
    }

    /// Run a cycle regardless of the running flag, recording failures in `lastError`
    pub async fn run(&self, trigger: CycleTrigger) -> Result<BotState> {
        let _guard = self.gate.lock().await;
        self.run_locked(trigger).await
    }

    /// Run a cycle only while the bot is started
    pub async fn run_if_running(&self, trigger: CycleTrigger) -> Result<CycleOutcome> {
        let _guard = self.gate.lock().await;

        let state = self.store.snapshot().await;
        if !state.running {
            debug!(trigger = trigger.as_str(), "Bot stopped, skipping cycle");
            return Ok(CycleOutcome::Skipped(state));
        }

        self.run_locked(trigger).await.map(CycleOutcome::Completed)
    }

    async fn run_locked(&self, trigger: CycleTrigger) -> Result<BotState> {
        let started = Instant::now();
        info!(trigger = trigger.as_str(), engine = self.engine.name(), "Running trading cycle");

        match self.engine.run_cycle(&self.store).await {
            Ok(state) => {
                info!(
                    trigger = trigger.as_str(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Cycle complete"
                );
                Ok(state)
            }
            Err(e) => {
                let message = e.to_string();
                error!(trigger = trigger.as_str(), error = %message, "Cycle execution failed");
                self.store
                    .update(|state| state.last_error = Some(message))
                    .await;
                Err(e)
            }
        }
    }

    /// Periodic cycles until `shutdown` flips to true
    pub async fn run_scheduled(self, every: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = every.as_secs(), "Cycle scheduler started");

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Failures are already logged and recorded in state
                    let _ = self.run_if_running(CycleTrigger::Scheduler).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Cycle scheduler stopped");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::types::AccountSummary;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEngine {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl TradingEngine for CountingEngine {
        fn name(&self) -> &str {
            "counting"
        }

        async fn account_summary(&self) -> Result<AccountSummary> {
            Err(EngineError::Bridge("not used".to_string()))
        }

        async fn run_cycle(&self, store: &BotStateStore) -> Result<BotState> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EngineError::Bridge("terminal offline".to_string()));
            }
            Ok(store.update(|s| s.last_run = Some(Utc::now())).await)
        }
    }

    fn runner(fail: bool) -> (CycleRunner, Arc<CountingEngine>, BotStateStore) {
        let engine = Arc::new(CountingEngine {
            calls: AtomicUsize::new(0),
            fail,
        });
        let store = BotStateStore::in_memory();
        (CycleRunner::new(engine.clone(), store.clone()), engine, store)
    }

    #[tokio::test]
    async fn test_failure_recorded_in_last_error() {
        let (runner, _, store) = runner(true);

        let err = runner.run(CycleTrigger::Manual).await.unwrap_err();
        assert!(err.to_string().contains("terminal offline"));

        let state = store.snapshot().await;
        assert_eq!(state.last_error, Some(err.to_string()));
        assert!(state.last_run.is_none());
    }

    #[tokio::test]
    async fn test_run_if_running_skips_when_stopped() {
        let (runner, engine, _) = runner(false);

        let outcome = runner.run_if_running(CycleTrigger::Cron).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Skipped(_)));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_if_running_completes_when_started() {
        let (runner, engine, store) = runner(false);
        store.update(|s| s.running = true).await;

        let outcome = runner.run_if_running(CycleTrigger::Cron).await.unwrap();
        match outcome {
            CycleOutcome::Completed(state) => assert!(state.last_run.is_some()),
            other => panic!("expected completed cycle, got {:?}", other),
        }
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_runs_until_shutdown() {
        let (runner, engine, store) = runner(false);
        store.update(|s| s.running = true).await;

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(runner.run_scheduled(Duration::from_secs(60), rx));

        tokio::time::sleep(Duration::from_secs(150)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }
}
