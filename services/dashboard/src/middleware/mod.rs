//! Middleware for the dashboard service

pub mod cron_auth;

pub use cron_auth::cron_auth_middleware;
