//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forex_engine::ConfigIssue;
use serde_json::json;

/// Errors surfaced at the route boundary as JSON bodies
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported action")]
    UnsupportedAction,

    #[error("Invalid configuration")]
    InvalidConfig(Vec<ConfigIssue>),

    #[error("Cycle failed")]
    CycleFailed(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        let (status, body) = match self {
            ApiError::UnsupportedAction => (StatusCode::BAD_REQUEST, json!({ "error": error })),
            ApiError::InvalidConfig(issues) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error, "issues": issues }),
            ),
            ApiError::CycleFailed(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": error, "details": details }),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": error })),
        };

        (status, Json(body)).into_response()
    }
}
