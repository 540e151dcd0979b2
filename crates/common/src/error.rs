//! Error types for gavel.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Enforcement Errors ===
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Illegal escalation: {0}")]
    IllegalEscalation(String),

    #[error("Duplicate processing: {0}")]
    DuplicateProcessing(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UnknownAccount(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_)
            | Self::InvalidTransition(_)
            | Self::IllegalEscalation(_)
            | Self::DuplicateProcessing(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::IllegalEscalation(_) => "ILLEGAL_ESCALATION",
            Self::DuplicateProcessing(_) => "DUPLICATE_PROCESSING",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforcement_errors_map_to_conflict() {
        assert_eq!(
            AppError::InvalidTransition("frozen".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::IllegalEscalation("backward".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DuplicateProcessing("a1".to_string()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidTransition(String::new()).error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(
            AppError::UnknownAccount(String::new()).error_code(),
            "UNKNOWN_ACCOUNT"
        );
        assert_eq!(AppError::Unauthorized.error_code(), "UNAUTHORIZED");
    }
}
