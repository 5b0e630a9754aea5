//! Unified error handling for the HTTP layer.
//!
//! All route handlers return `Result<T, AppError>`. The service taxonomy
//! maps onto status codes here and nowhere else; 5xx detail is logged but
//! never exposed to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::{AuthError, ServiceError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Service operation failed.
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found (route-level).
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
                ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                ServiceError::Store(_) | ServiceError::Files(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::TokenInvalid
                | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Store(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message; internal detail stays in the logs.
    fn message(&self) -> String {
        match self {
            Self::Service(ServiceError::Store(_) | ServiceError::Files(_))
            | Self::Auth(AuthError::Store(_) | AuthError::PasswordHash)
            | Self::Internal(_) => "internal server error".to_owned(),
            Self::Auth(AuthError::InvalidCredentials) => "invalid credentials".to_owned(),
            Self::Auth(AuthError::UserAlreadyExists) => {
                "an account with this email already exists".to_owned()
            }
            Self::Auth(AuthError::TokenInvalid | AuthError::TokenExpired) => {
                "invalid or expired token".to_owned()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request error");
        }

        let body = serde_json::json!({
            "message": self.message(),
            "data": null,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for route handlers.
pub type Result<T> = std::result::Result<T, AppError>;
