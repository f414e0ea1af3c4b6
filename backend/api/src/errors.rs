//! Application-wide error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use volunteer_ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(e) => match e {
                LedgerError::Unauthorized(_) | LedgerError::NgoNotVerified(_) => {
                    StatusCode::FORBIDDEN
                }
                LedgerError::InvalidPrincipal(_) | LedgerError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::AlreadyRegistered(_) | LedgerError::NonTransferable(_) => {
                    StatusCode::CONFLICT
                }
            },
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Migrate(_) | ApiError::Json(_) | ApiError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
