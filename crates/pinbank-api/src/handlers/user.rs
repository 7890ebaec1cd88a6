//! User account handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pinbank_ledger::LedgerError;
use std::sync::Arc;

use crate::dto::{
    MessageResponse, UserCreatedResponse, UserDetails, UserIdentifier, UserUpdateRequest,
    UserUpdatedResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Create a new user or update an existing user's balance
///
/// Updating requires the stored PIN to match; creation stores the supplied
/// PIN. Creation answers 201, an update 200.
pub async fn upsert_user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UserUpdateRequest>,
) -> ApiResult<Response> {
    let (created, balance) = state
        .ledger
        .upsert_authorized(&name, &request.pin, request.balance)
        .await
        .map_err(|err| match err {
            LedgerError::AuthorizationFailed => {
                ApiError::Unauthorized("Invalid PIN for user update".to_string())
            }
            other => ApiError::from(other),
        })?;

    if created {
        tracing::info!(name = %name, "account created");
        let body = UserCreatedResponse {
            message: format!("User {name} created successfully."),
            user: UserDetails { name, balance },
        };
        Ok((StatusCode::CREATED, Json(body)).into_response())
    } else {
        tracing::info!(name = %name, "balance updated");
        let body = UserUpdatedResponse {
            message: format!("User {name}'s balance updated successfully."),
            balance,
        };
        Ok(Json(body).into_response())
    }
}

/// Delete a user after PIN verification
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<UserIdentifier>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .ledger
        .delete(&name, &request.pin)
        .await
        .map_err(|err| match err {
            LedgerError::AccountNotFound { .. } => ApiError::NotFound("User not found".to_string()),
            LedgerError::AuthorizationFailed => {
                ApiError::Unauthorized("Invalid PIN for user deletion".to_string())
            }
            other => ApiError::from(other),
        })?;

    tracing::info!(name = %name, "account deleted");

    Ok(Json(MessageResponse {
        message: format!("User {name} deleted successfully."),
    }))
}
