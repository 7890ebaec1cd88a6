//! PinBank REST API
//!
//! Thin HTTP adapter over the account ledger. Every endpoint translates a
//! request into one of the four ledger operations; all business invariants
//! live in `pinbank-ledger`.
//!
//! # Endpoints
//!
//! ```text
//! POST   /authenticate        - check name/PIN, return balance
//! GET    /authenticate?name=  - prompt-for-PIN payload
//! POST   /banktransfer        - move funds, 303 to recipient's prompt
//! PUT    /user/{name}         - create or update an account
//! DELETE /user/{name}         - delete an account (PIN required)
//! GET    /health              - liveness
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

/// Create the API router with middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let mut router = routes::ledger_routes().with_state(state);

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        );
    }

    if config.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

/// Create a minimal router for testing
pub fn create_test_router(state: Arc<AppState>) -> Router {
    routes::ledger_routes().with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_tracing);
    }
}
