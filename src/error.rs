use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use compute::ComputeError;
use model::RepositoryError;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::{AuthError, CredentialError, SigningError};
use crate::schemas::ErrorResponse;

/// Errors returned by handlers. Converted to a JSON `ErrorResponse` at the
/// boundary; internal detail is logged, never sent.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Auth(AuthError::MissingToken) => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            ApiError::Auth(AuthError::InvalidToken(_)) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN")
            }
            ApiError::Auth(AuthError::ExpiredToken) => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            ApiError::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
            }
            ApiError::Duplicate(_) => (StatusCode::BAD_REQUEST, "ALREADY_EXISTS"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn internal(context: &str, detail: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, detail);
        ApiError::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_client_error() {
            warn!("Request failed with {}: {}", status, self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(message) => ApiError::Validation(message),
            RepositoryError::Duplicate => ApiError::Duplicate(err.to_string()),
            RepositoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RepositoryError::Database(db_err) => ApiError::internal("Database error", db_err),
        }
    }
}

impl From<ComputeError> for ApiError {
    fn from(err: ComputeError) -> Self {
        ApiError::internal("Progress computation failed", err)
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingFields => ApiError::Validation(err.to_string()),
            CredentialError::DuplicateEmail => ApiError::Duplicate(err.to_string()),
            CredentialError::Auth(auth) => ApiError::Auth(auth),
            CredentialError::Hashing(detail) => {
                error!("Password hashing failed: {}", detail);
                ApiError::Internal("Failed to process password".to_string())
            }
            CredentialError::Database(db_err) => ApiError::internal("Database error", db_err),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        ApiError::internal("Token issuance failed", err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
