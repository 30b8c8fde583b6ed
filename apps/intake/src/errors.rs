use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::PersistenceError;
use crate::storage::StorageError;

/// Body of the `400` returned when the `cv` part is absent or empty.
pub const NO_FILE_UPLOADED: &str = "No file uploaded";
/// Generic message for every server-side failure. Causes are logged, never returned.
pub const SUBMISSION_FAILED: &str = "Error submitting application";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Notification failures have no variant here: they never reach a handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingFile => {
                tracing::warn!("Rejected submission without a CV");
                (StatusCode::BAD_REQUEST, NO_FILE_UPLOADED.to_string())
            }
            AppError::BadRequest(msg) => {
                tracing::warn!("Rejected submission: {msg}");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::PayloadTooLarge(detail) => {
                tracing::warn!("Rejected oversized submission: {detail}");
                (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "Uploaded file is too large".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, SUBMISSION_FAILED.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
