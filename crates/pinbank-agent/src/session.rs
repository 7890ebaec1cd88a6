//! Conversation session persistence
//!
//! The agent keeps conversation turns per session id so a session survives
//! process restarts. Turns are stored as serialized [`Message`] values in
//! SQLite; an in-memory store backs tests and throwaway sessions.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::RwLock;

use crate::types::{AgentError, Message, Result};

/// Storage for conversation turns, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All turns of a session, oldest first. Unknown ids yield an empty
    /// history.
    async fn history(&self, session_id: &str) -> Result<Vec<Message>>;

    /// Append turns to a session
    async fn append(&self, session_id: &str, messages: &[Message]) -> Result<()>;

    /// Drop all turns of a session
    async fn clear(&self, session_id: &str) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Volatile session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn append(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

// ============================================================================
// SQLite store
// ============================================================================

/// SQLite-backed session store
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) a session database at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(options).await
    }

    /// Open an in-memory session database
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(store_error)?;
        Self::with_options(options).await
    }

    async fn with_options(options: SqliteConnectOptions) -> Result<Self> {
        // A single connection keeps in-memory databases coherent and is
        // plenty for a conversational workload.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(store_error)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session_turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                turn TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(store_error)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_turns_session
             ON session_turns (session_id)",
        )
        .execute(&pool)
        .await
        .map_err(store_error)?;

        Ok(Self { pool })
    }
}

fn store_error(err: impl std::fmt::Display) -> AgentError {
    AgentError::SessionStore {
        message: err.to_string(),
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn history(&self, session_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT turn FROM session_turns WHERE session_id = ?1 ORDER BY id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter()
            .map(|row| {
                let turn: String = row.try_get("turn").map_err(store_error)?;
                serde_json::from_str(&turn).map_err(store_error)
            })
            .collect()
    }

    async fn append(&self, session_id: &str, messages: &[Message]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        for message in messages {
            let turn = serde_json::to_string(message).map_err(store_error)?;
            sqlx::query("INSERT INTO session_turns (session_id, turn) VALUES (?1, ?2)")
                .bind(session_id)
                .bind(turn)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }
        tx.commit().await.map_err(store_error)
    }

    async fn clear(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM session_turns WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
