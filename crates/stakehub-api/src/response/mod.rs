//! Response types and error handling for API endpoints
//!
//! Every error renders as `{"error": "<message>"}`, with flow-specific
//! fields flattened next to it. Server-side detail is logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use stakehub_common::{AppError, ErrorResponse};
use stakehub_core::DomainError;
use stakehub_service::ServiceError;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// API error type for consistent error responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => match e {
                DomainError::Overloaded | DomainError::Timeout(_) => 503,
                e if e.is_not_found() => 404,
                e if e.is_validation() => 400,
                _ => 500,
            },
            Self::Validation(_) | Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get error code for logs
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::Validation(_) | Self::BadRequest(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Body sent to the client
    pub fn body(&self) -> ErrorResponse {
        if self.status_code().is_server_error() {
            let message = if self.status_code() == StatusCode::SERVICE_UNAVAILABLE {
                "Service temporarily unavailable"
            } else {
                "Internal server error"
            };
            return ErrorResponse::new(message);
        }

        match self {
            Self::App(e) => ErrorResponse::from(e),
            Self::Service(e) => e.error_response(),
            Self::Validation(errors) => ErrorResponse::new(first_validation_message(errors)),
            other => ErrorResponse::new(other.to_string()),
        }
    }
}

/// The first message a validator attached, for a single-line error body
fn first_validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "Invalid request".to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, code = self.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
