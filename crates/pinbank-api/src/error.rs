//! API error handling
//!
//! Maps ledger errors onto HTTP status codes and the `{"detail": ...}`
//! error body the previous incarnation of this service emitted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pinbank_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error detail
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Default mapping from ledger errors.
///
/// Handlers that need the original endpoint-specific wording (sender vs
/// recipient, update vs deletion) map the error themselves before this
/// conversion applies.
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AuthenticationFailed => Self::Unauthorized("Invalid name or PIN".to_string()),
            LedgerError::AuthorizationFailed => Self::Unauthorized("Invalid PIN".to_string()),
            LedgerError::AccountNotFound { name } => {
                Self::NotFound(format!("Account '{name}' not found"))
            }
            LedgerError::InsufficientFunds { .. } => Self::BadRequest("Insufficient funds".to_string()),
            LedgerError::InvalidAmount { message } => Self::BadRequest(message),
        }
    }
}
