pub mod dashboard;
pub mod error;
pub mod handlers {
    pub mod account;
    pub mod bot;
    pub mod config;
    pub mod cron;
    pub mod logs;
}
pub mod health;
pub mod middleware;
pub mod observability;
pub mod settings;

use axum::{routing::get, Router};
use forex_engine::{BotStateStore, CycleRunner, TradingEngine};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use observability::{LogBuffer, LogEntry};
pub use settings::AppSettings;

/// Application state shared across handlers
pub struct AppState {
    pub store: BotStateStore,
    pub cycles: CycleRunner,
    pub logs: LogBuffer,
    /// Bearer token guarding `/api/cron`
    pub cron_secret: Option<String>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: BotStateStore,
        engine: Arc<dyn TradingEngine>,
        logs: LogBuffer,
        cron_secret: Option<String>,
    ) -> Self {
        Self {
            cycles: CycleRunner::new(engine, store.clone()),
            store,
            logs,
            cron_secret,
            started_at: Instant::now(),
        }
    }

    pub fn engine(&self) -> &Arc<dyn TradingEngine> {
        self.cycles.engine()
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Scheduler-facing route, optionally behind a shared secret
    let cron_routes = Router::new()
        .route("/api/cron", get(handlers::cron::run_cron))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::cron_auth_middleware,
        ));

    Router::new()
        .route("/", get(dashboard::index))
        .route("/api/account", get(handlers::account::get_account))
        .route(
            "/api/bot",
            get(handlers::bot::get_bot).post(handlers::bot::bot_action),
        )
        .route(
            "/api/config",
            get(handlers::config::get_config).post(handlers::config::update_config),
        )
        .route("/api/logs", get(handlers::logs::get_logs))
        .route("/api/health", get(health::health_detail))
        .route("/healthz", get(health::healthz))
        .merge(cron_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
