//! Application state shared across handlers

use pinbank_ledger::Ledger;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The account ledger
    pub ledger: Ledger,
}

impl AppState {
    /// Create a new application state around an existing ledger
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }
}
