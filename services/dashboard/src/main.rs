use forex_dashboard::{observability, AppSettings, AppState, LogBuffer};
use forex_engine::{BotStateStore, MetaTraderBridge, MetaTraderEngine, TradingEngine};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::load()?;

    // Initialize logging
    let logs = LogBuffer::new(settings.logs.capacity);
    observability::init_tracing(logs.clone());

    info!("Starting Forex Bot Dashboard...");

    let store = match &settings.state.file {
        Some(path) => {
            info!(path = %path, "Using persisted bot state");
            BotStateStore::open(path).await?
        }
        None => {
            warn!("No state file configured, bot state is in-memory only");
            BotStateStore::in_memory()
        }
    };

    let bridge = MetaTraderBridge::new(
        &settings.bridge.url,
        settings.bridge.token.clone(),
        settings.bridge_timeout(),
    )?;
    info!(url = %bridge.base_url(), "MetaTrader bridge client initialized");
    let engine: Arc<dyn TradingEngine> = Arc::new(MetaTraderEngine::new(bridge));

    if settings.cron.secret.is_none() {
        warn!("No cron secret configured, /api/cron is open");
    }

    let state = Arc::new(AppState::new(
        store,
        engine,
        logs,
        settings.cron.secret.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = settings.scheduler_interval().map(|every| {
        tokio::spawn(state.cycles.clone().run_scheduled(every, shutdown_rx))
    });

    let app = forex_dashboard::app(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    info!("Dashboard listening on {}", settings.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Some(handle) = scheduler {
        handle.await.ok();
    }

    info!("Dashboard stopped");
    Ok(())
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!("Shutdown requested");
    shutdown_tx.send(true).ok();
}
