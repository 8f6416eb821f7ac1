use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::TokenError;
use crate::store::StoreError;
use crate::utils::error_codes;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> i32 {
        match self {
            AppError::DuplicateEmail => error_codes::USER_EXISTS,
            AppError::InvalidCredentials => error_codes::AUTH_FAILED,
            AppError::Unauthorized => error_codes::UNAUTHORIZED,
            AppError::InvalidOrExpiredToken => error_codes::INVALID_RESET_TOKEN,
            AppError::NotFound => error_codes::NOT_FOUND,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // internal details stay in the log; log_errors picks up the 5xx
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: self.code(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => AppError::Unauthorized,
            TokenError::Signing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", err))
    }
}
