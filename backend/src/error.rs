//! Error handling for the Farm Weather service
//!
//! Every failure surfaces as a typed outcome; HTTP handlers turn it into a
//! JSON error body with a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    // Update cycle stages
    #[error("Weather fetch failed: {0}")]
    Fetch(String),

    #[error("Weather transform failed: {0}")]
    Transform(String),

    #[error("Weather persist failed: {0}")]
    Persist(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Stored data that cannot be read back as its declared type
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<shared::FieldError> for AppError {
    fn from(err: shared::FieldError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

/// Failure of one fetch-update cycle.
///
/// Cloneable so callers attached to an in-flight cycle receive the same
/// outcome as the caller that ran it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("persist failed: {0}")]
    Persist(String),

    /// The cycle task panicked or was cancelled
    #[error("update aborted: {0}")]
    Aborted(String),
}

impl From<CycleError> for AppError {
    fn from(err: CycleError) -> Self {
        match err {
            CycleError::Fetch(msg) => AppError::Fetch(msg),
            CycleError::Transform(msg) => AppError::Transform(msg),
            CycleError::Persist(msg) => AppError::Persist(msg),
            CycleError::Aborted(msg) => AppError::Persist(msg),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::Fetch(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "WEATHER_FETCH_FAILED".to_string(),
                    message: format!("Weather provider unavailable: {}", msg),
                    field: None,
                },
            ),
            AppError::Transform(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "WEATHER_TRANSFORM_FAILED".to_string(),
                    message: format!("Weather provider returned malformed data: {}", msg),
                    field: None,
                },
            ),
            AppError::Persist(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "WEATHER_PERSIST_FAILED".to_string(),
                    message: "Weather data could not be saved".to_string(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not available", resource),
                    field: None,
                },
            ),
            AppError::Store(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORE_ERROR".to_string(),
                    message: "The document store is unavailable".to_string(),
                    field: None,
                },
            ),
            AppError::DataIntegrity(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATA_INTEGRITY_ERROR".to_string(),
                    message: format!("Stored data is invalid: {}", msg),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers and services
pub type AppResult<T> = Result<T, AppError>;
