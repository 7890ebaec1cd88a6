//! Request/response types for the PinBank API
//!
//! The wire format mirrors the service this replaces: snake_case request
//! fields and a `message` string alongside any data in responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body for `POST /authenticate`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateRequest {
    pub name: String,
    pub pin: String,
}

/// Response for a successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub message: String,
    pub balance: Decimal,
}

/// Query for `GET /authenticate?name=`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatePromptQuery {
    pub name: String,
}

/// Response prompting for a PIN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatePromptResponse {
    pub message: String,
    pub name: String,
}

/// Body for `POST /banktransfer`
#[derive(Debug, Clone, Deserialize)]
pub struct TransferRequest {
    pub sender_name: String,
    pub recipient_name: String,
    pub amount: Decimal,
    /// Only consulted when the ledger requires transfer authorization
    #[serde(default)]
    pub sender_pin: Option<String>,
}

/// Body for `PUT /user/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdateRequest {
    pub pin: String,
    pub balance: Decimal,
}

/// Response for a balance update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub balance: Decimal,
}

/// Response for account creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedResponse {
    pub message: String,
    pub user: UserDetails,
}

/// Public view of an account (the PIN never leaves the ledger)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub name: String,
    pub balance: Decimal,
}

/// Body for `DELETE /user/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserIdentifier {
    pub pin: String,
}

/// Generic message-only response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
