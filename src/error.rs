use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("{action}: {source}")]
    Operation {
        action: &'static str,
        source: StoreError,
    },

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wraps a store failure with the user-facing name of what was being
    /// done. A missing task stays a 404.
    pub fn operation(action: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::NotFound(_) => AppError::Store(source),
            source => AppError::Operation { action, source },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Store(StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Task not found".to_string(), None)
            }
            AppError::Store(e) => {
                error!("store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Store error occurred".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Operation { action, source } => {
                error!("{} failed: {}", action, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    action.to_string(),
                    Some(source.to_string()),
                )
            }
            AppError::Auth(e) => (StatusCode::UNAUTHORIZED, e.client_message().to_string(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            details,
        });

        (status, body).into_response()
    }
}
