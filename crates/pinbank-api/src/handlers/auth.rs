//! Authentication handlers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::dto::{
    AuthenticateRequest, AuthenticatePromptQuery, AuthenticatePromptResponse, AuthenticateResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Authenticate a user and return their balance
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AuthenticateRequest>,
) -> ApiResult<Json<AuthenticateResponse>> {
    let balance = state
        .ledger
        .authenticate(&request.name, &request.pin)
        .await?;

    tracing::debug!(name = %request.name, "authenticated");

    Ok(Json(AuthenticateResponse {
        message: format!("Welcome, {}!", request.name),
        balance,
    }))
}

/// Prompt-for-PIN payload, used as the landing page after a transfer
pub async fn authenticate_prompt(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthenticatePromptQuery>,
) -> ApiResult<Json<AuthenticatePromptResponse>> {
    if !state.ledger.exists(&query.name).await {
        return Err(crate::error::ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(AuthenticatePromptResponse {
        message: format!(
            "Authentication required for {}. Please provide your PIN to see your balance.",
            query.name
        ),
        name: query.name,
    }))
}
