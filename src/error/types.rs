use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::sanitize_log_message;
use crate::services::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized request")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// Wire shape shared by every error response: `{"error":{"message":"..."}}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: ErrorMessage,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorMessage {
                message: message.into(),
            },
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Server(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let detail = match &self {
                AppError::Internal(source) => format!("{:#}", source),
                other => other.to_string(),
            };
            tracing::error!(error = %sanitize_log_message(&detail), "Request failed");
        }

        // Don't expose internal error details
        let body = match &self {
            AppError::Internal(_) => ErrorBody::new("Internal error"),
            _ => ErrorBody::new(self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) | StoreError::ValidationFailed(_) => {
                AppError::InvalidInput(err.to_string())
            }
            StoreError::ConnectionFailed(_) => AppError::ServiceUnavailable(err.to_string()),
            StoreError::QueryFailed(_) => AppError::Server(err.to_string()),
            // A stored row that no longer decodes is our fault, not the caller's
            StoreError::Serialization(_) => AppError::Internal(err.into()),
        }
    }
}
