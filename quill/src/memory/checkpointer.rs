//! Checkpointer trait and CheckpointError.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error type for checkpoint operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckpointError {
    #[error("session id required")]
    SessionIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
}

/// One entry of a session's checkpoint history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    /// 1 for the first save of the session, then +1 per save.
    pub step: u64,
    pub created_at: DateTime<Utc>,
}

/// Saves and loads session state by session id.
///
/// Implementations are internally synchronized for their own storage only;
/// concurrent turns on one session must be serialized by the caller.
///
/// **Interaction**: Held as `Arc<dyn Checkpointer<SessionState>>` by
/// `TutorialWorkflow`; loaded at turn start, saved at turn end.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Latest saved state, or `None` for a new session.
    async fn load(&self, session_id: &str) -> Result<Option<S>, CheckpointError>;

    /// Appends a checkpoint. Returns its id.
    async fn save(&self, session_id: &str, state: &S) -> Result<String, CheckpointError>;

    /// Checkpoint history, oldest first. `limit` keeps the newest entries.
    async fn list(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;

    /// Drops every checkpoint of the session. Unknown sessions are not an error.
    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError>;
}

pub(crate) fn require_session_id(session_id: &str) -> Result<&str, CheckpointError> {
    let id = session_id.trim();
    if id.is_empty() {
        Err(CheckpointError::SessionIdRequired)
    } else {
        Ok(id)
    }
}

pub(crate) fn new_checkpoint_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Keeps the last `limit` items of an oldest-first list.
pub(crate) fn keep_newest<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(n) = limit {
        if items.len() > n {
            items.drain(..items.len() - n);
        }
    }
    items
}
