//! Session store port
//!
//! Persistence sink for concluded sessions. A judging session reads the
//! transcripts of earlier sessions back through it.

use async_trait::async_trait;
use boardroom_domain::SessionResult;
use thiserror::Error;

/// Errors from a session store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid session id: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for finished sessions, keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a result, replacing any earlier record with the same id.
    async fn save(&self, result: &SessionResult) -> Result<(), StoreError>;

    /// Load a result; `Ok(None)` when nothing was stored under `session_id`.
    async fn fetch(&self, session_id: &str) -> Result<Option<SessionResult>, StoreError>;

    /// Ids of all stored sessions, sorted.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}
