//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::board::BoardError;
use crate::share::CodecError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record collection error
    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    /// Token could not be decoded in any format
    #[error("Decode error: {0}")]
    Decode(#[from] crate::share::DecodeFailure),

    /// Model response could not be read
    #[error("Extraction error: {0}")]
    Extract(#[from] crate::extract::ExtractError),

    /// Spreadsheet export failed
    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Board(BoardError::RecordNotFound(_)) => {
                (StatusCode::NOT_FOUND, "RECORD_NOT_FOUND")
            }
            ApiError::Board(BoardError::InvalidRecord { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RECORD")
            }
            ApiError::Board(BoardError::Encode(CodecError::TooLong { .. })) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "DATASET_TOO_LARGE")
            }
            ApiError::Board(BoardError::Encode(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR")
            }
            ApiError::Decode(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_ERROR"),
            ApiError::Extract(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACT_ERROR"),
            ApiError::Export(_) => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        // Client mistakes are expected traffic
        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
