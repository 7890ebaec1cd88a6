//! PinBank Agent - conversational banking adapter
//!
//! A tool-calling assistant that fronts the account ledger: the model
//! decides when to invoke one of four banking tools based on free-text
//! input, and every tool call lands in the same `pinbank_ledger::Ledger`
//! the HTTP API uses.
//!
//! # Key design principles
//!
//! 1. The model may **propose** actions; only the tool dispatcher touches
//!    the ledger, and the ledger enforces all invariants
//! 2. Tool failures flow back to the model as text, not process errors
//! 3. Conversations persist across restarts, keyed by session id

pub mod provider;
pub mod runner;
pub mod session;
pub mod tools;
pub mod types;

pub use provider::{ChatProvider, OpenAiCompatProvider, ProviderConfig, ScriptedProvider};
pub use runner::{AgentRunner, BANKING_INSTRUCTIONS};
pub use session::{MemorySessionStore, SessionStore, SqliteSessionStore};
pub use tools::{tool_specs, ToolExecutor};
pub use types::*;
