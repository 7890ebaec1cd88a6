//! Fund transfer handler

use axum::{
    extract::State,
    response::Redirect,
    Json,
};
use pinbank_ledger::LedgerError;
use std::sync::Arc;

use crate::dto::TransferRequest;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Transfer an amount from a sender to a recipient
///
/// On success redirects (303 See Other) to the authenticate prompt for the
/// recipient, as the service this replaces did.
pub async fn bank_transfer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransferRequest>,
) -> ApiResult<Redirect> {
    state
        .ledger
        .transfer(
            &request.sender_name,
            &request.recipient_name,
            request.amount,
            request.sender_pin.as_deref(),
        )
        .await
        .map_err(|err| match err {
            LedgerError::AccountNotFound { name } if name == request.sender_name => {
                ApiError::NotFound("Sender not found".to_string())
            }
            LedgerError::AccountNotFound { .. } => {
                ApiError::NotFound("Recipient not found".to_string())
            }
            other => ApiError::from(other),
        })?;

    tracing::info!(
        sender = %request.sender_name,
        recipient = %request.recipient_name,
        amount = %request.amount,
        "transfer completed"
    );

    Ok(Redirect::to(&format!(
        "/authenticate?name={}",
        request.recipient_name
    )))
}
