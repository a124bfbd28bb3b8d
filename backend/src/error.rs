//! Error handling for the Ziel Analytics backend
//!
//! Provides consistent error responses in Indonesian and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Ingestion errors
    #[error("Schema error in {dataset} dataset: required column '{column}' not found")]
    Schema { dataset: String, column: String },

    #[error("Upload error: {0}")]
    Upload(String),

    // Authorization errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_id: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Dataset not loaded: {0}")]
    DatasetNotLoaded(String),

    // Analytics errors
    #[error("Insufficient data for {model}: requires {required} points, got {available}")]
    InsufficientData {
        model: String,
        required: usize,
        available: usize,
    },

    // Persistence errors
    #[error("Storage error: {0}")]
    StorageError(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Schema { dataset, column } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "SCHEMA_ERROR".to_string(),
                    message_en: format!(
                        "The {} dataset is missing required column '{}'",
                        dataset, column
                    ),
                    message_id: format!(
                        "Dataset {} tidak memiliki kolom wajib '{}'",
                        dataset, column
                    ),
                    field: Some(column.clone()),
                },
            ),
            AppError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "UPLOAD_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_id: format!("Gagal mengunggah berkas: {}", msg),
                    field: None,
                },
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail {
                    code: "UNAUTHORIZED".to_string(),
                    message_en: msg.clone(),
                    message_id: "Tidak diizinkan".to_string(),
                    field: None,
                },
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "FORBIDDEN".to_string(),
                    message_en: msg.clone(),
                    message_id: "Anda tidak memiliki akses untuk tindakan ini".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_id,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_id: message_id.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_id: format!("Data tidak valid: {}", msg),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_id: format!("{} tidak ditemukan", resource),
                    field: None,
                },
            ),
            AppError::DatasetNotLoaded(dataset) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DATASET_NOT_LOADED".to_string(),
                    message_en: format!("The {} dataset has not been uploaded yet", dataset),
                    message_id: format!("Dataset {} belum diunggah", dataset),
                    field: None,
                },
            ),
            AppError::InsufficientData {
                model,
                required,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_DATA".to_string(),
                    message_en: format!(
                        "Not enough history for the {} model: requires {} points, got {}",
                        model, required, available
                    ),
                    message_id: format!(
                        "Riwayat data tidak cukup untuk model {}: butuh {} titik, tersedia {}",
                        model, required, available
                    ),
                    field: None,
                },
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORAGE_ERROR".to_string(),
                    message_en: format!("Storage error: {}", msg),
                    message_id: format!("Terjadi kesalahan penyimpanan: {}", msg),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_id: "Terjadi kesalahan internal pada server".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_id: "Terjadi kesalahan internal pada server".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
