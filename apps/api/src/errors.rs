use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Domain failures are not signalled through HTTP status codes: every variant
/// renders `200 OK` with a `{"success": false, "message": ...}` body.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Not authorised, login again")]
    Unauthenticated,

    #[error("{0}")]
    InvalidToken(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Already Applied")]
    AlreadyApplied,

    #[error("Invalid response format")]
    MalformedResponse,

    #[error("AI response is not valid JSON: {0}")]
    AiParse(#[from] serde_json::Error),

    #[error("AI provider error: {0}")]
    Llm(String),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code included next to the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidToken(_) => "INVALID_TOKEN",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::AlreadyApplied => "ALREADY_APPLIED",
            AppError::MalformedResponse => "MALFORMED_RESPONSE",
            AppError::AiParse(_) => "AI_PARSE_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Store(StoreError::Conflict(_)) => "CONFLICT",
            AppError::Store(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        match &self {
            AppError::Store(e) => tracing::error!(code, "Store error: {e}"),
            AppError::Llm(msg) => tracing::error!(code, "LLM error: {msg}"),
            AppError::AiParse(e) => tracing::warn!(code, "AI parse error: {e}"),
            AppError::Storage(msg) => tracing::error!(code, "Storage error: {msg}"),
            AppError::Timeout(what) => tracing::error!(code, "{what} timed out"),
            AppError::Internal(e) => tracing::error!(code, "Internal error: {e:?}"),
            other => tracing::debug!(code, "Request rejected: {other}"),
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
            "code": code,
        }));

        (StatusCode::OK, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(err.body_text())
    }
}
