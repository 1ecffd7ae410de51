//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::repository::RepositoryError;
use crate::db::services::ServiceError;

/// API error response body.
///
/// The `error` key is what the frontend reads; `code` is the
/// machine-readable classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Missing or invalid credentials/token
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Internal server error
    Internal(String),
    /// Service-layer error, mapped by variant
    Service(ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg))
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
            }
            AppError::Internal(msg) => {
                error!(message = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", msg),
                )
            }
            AppError::Service(err) => return service_error_response(err),
        };

        (status, Json(body)).into_response()
    }
}

fn service_error_response(err: ServiceError) -> Response {
    let (status, body) = match err {
        ServiceError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
        }
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            ApiError::new("INVALID_CREDENTIALS", "Invalid credentials"),
        ),
        ServiceError::RoleMismatch => (
            StatusCode::FORBIDDEN,
            ApiError::new("ROLE_MISMATCH", "Role mismatch"),
        ),
        ServiceError::NotFound(msg) => {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
        }
        // Duplicate unique fields report as plain 400s, which is what the
        // frontend's form handling expects.
        ServiceError::Conflict(msg) => {
            (StatusCode::BAD_REQUEST, ApiError::new("CONFLICT", msg))
        }
        ServiceError::Internal(msg) => {
            error!(message = %msg, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            )
        }
        ServiceError::Repository(repo_err) => {
            error!(error = %repo_err, "repository error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("REPOSITORY_ERROR", repo_err.to_string()),
            )
        }
    };

    (status, Json(body)).into_response()
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Service(ServiceError::from(err))
    }
}
