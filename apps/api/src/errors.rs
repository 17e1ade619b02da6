use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::draft_store::StoreError;
use crate::form::controller::SubmitBlocked;
use crate::models::draft::DraftError;
use crate::submission::GeneratorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid draft field: {0}")]
    Draft(#[from] DraftError),

    #[error("Submission blocked by {} field error(s)", .0.errors.len())]
    SubmitBlocked(SubmitBlocked),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Draft(e) => (StatusCode::BAD_REQUEST, "INVALID_FIELD", e.to_string()),
            AppError::SubmitBlocked(blocked) => {
                let body = Json(json!({
                    "error": {
                        "code": "SUBMIT_BLOCKED",
                        "message": self.to_string(),
                        "fields": blocked.errors,
                        "first_field": blocked.first_field,
                        "progress": blocked.progress,
                    }
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Generator(e) => {
                tracing::error!("Generator error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATOR_ERROR",
                    "Failed to create resume, please try again".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
