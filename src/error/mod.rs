//! Centralized API error handling for Tradepost
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Account suspended: {0}")]
    AccountBanned(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::AccountBanned(_) => "ACCOUNT_BANNED",
            ApiError::PaymentRequired(_) => "PAYMENT_REQUIRED",
            ApiError::TooManyRequests => "TOO_MANY_REQUESTS",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::AccountBanned(_) => StatusCode::FORBIDDEN,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log server errors
        match &self {
            ApiError::InternalError(_)
            | ApiError::DatabaseError(_)
            | ApiError::ServiceUnavailable(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from common error types

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::ExternalServiceError(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

// Domain error mappings

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError::*;
        match err {
            EmailTaken => ApiError::Conflict(err.to_string()),
            InvalidCredentials | InvalidRefreshToken | SessionNotFound | TokenError(_) => {
                ApiError::Unauthorized(err.to_string())
            }
            AccountBanned => ApiError::AccountBanned(err.to_string()),
            NotAdmin => ApiError::Forbidden(err.to_string()),
            UserNotFound => ApiError::NotFound(err.to_string()),
            CodeError(_) => ApiError::BadRequest(err.to_string()),
            DatabaseError(_) => ApiError::DatabaseError(err.to_string()),
            EmailError(_) | PasswordError(_) => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<crate::orders::OrderError> for ApiError {
    fn from(err: crate::orders::OrderError) -> Self {
        use crate::orders::OrderError::*;
        match err {
            NotFound | ResourceNotFound => ApiError::NotFound(err.to_string()),
            ResourceNotAvailable | Expired => ApiError::BadRequest(err.to_string()),
            AlreadyPurchased | DuplicatePending | InvalidTransition(_, _) => {
                ApiError::Conflict(err.to_string())
            }
            Forbidden => ApiError::Forbidden(err.to_string()),
            Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<crate::resources::ResourceError> for ApiError {
    fn from(err: crate::resources::ResourceError) -> Self {
        use crate::resources::ResourceError::*;
        match err {
            NotFound => ApiError::NotFound(err.to_string()),
            Forbidden => ApiError::Forbidden(err.to_string()),
            NotPurchased => ApiError::PaymentRequired(err.to_string()),
            Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<crate::payments::PaymentError> for ApiError {
    fn from(err: crate::payments::PaymentError) -> Self {
        use crate::payments::PaymentError::*;
        match err {
            NotFound => ApiError::NotFound(err.to_string()),
            MethodUnavailable(_) | AmountOutOfRange => ApiError::BadRequest(err.to_string()),
            InsufficientBalance => ApiError::PaymentRequired(err.to_string()),
            Order(e) => e.into(),
            Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<crate::admin::AdminError> for ApiError {
    fn from(err: crate::admin::AdminError) -> Self {
        use crate::admin::AdminError::*;
        match err {
            UserNotFound | ResourceNotFound => ApiError::NotFound(err.to_string()),
            AdminTarget => ApiError::Forbidden(err.to_string()),
            Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            ApiError::AccountBanned("test".to_string()).error_code(),
            "ACCOUNT_BANNED"
        );
        assert_eq!(
            ApiError::PaymentRequired("test".to_string()).error_code(),
            "PAYMENT_REQUIRED"
        );
        assert_eq!(ApiError::TooManyRequests.error_code(), "TOO_MANY_REQUESTS");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AccountBanned("test".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
