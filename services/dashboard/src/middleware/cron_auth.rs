//! Shared-secret check for scheduler calls
//!
//! When a cron secret is configured, `/api/cron` only accepts
//! `Authorization: Bearer <secret>`. Without one the route is open.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{ApiError, AppState};

pub async fn cron_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(secret) = state.cron_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if token != Some(secret) {
        tracing::warn!(path = %request.uri().path(), "Rejected cron call with missing or wrong secret");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
