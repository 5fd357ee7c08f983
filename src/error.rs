use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// A single upstream source failed or timed out. The aggregator recovers
    /// from this locally, so it only reaches a client from direct lookups.
    #[error("Source query failed ({source_name}): {reason}")]
    SourceQueryFailed { source_name: String, reason: String },

    /// Every upstream source failed while aggregating related titles
    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn source_failed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AppError::SourceQueryFailed {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Aggregation(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) | AppError::SourceQueryFailed { .. } => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
