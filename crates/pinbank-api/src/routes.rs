//! API Routes

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Ledger routes, matching the surface of the service this replaces
pub fn ledger_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/authenticate",
            post(handlers::auth::authenticate).get(handlers::auth::authenticate_prompt),
        )
        .route("/banktransfer", post(handlers::transfer::bank_transfer))
        .route(
            "/user/:name",
            put(handlers::user::upsert_user).delete(handlers::user::delete_user),
        )
        .route("/health", get(handlers::health::health_check))
}
