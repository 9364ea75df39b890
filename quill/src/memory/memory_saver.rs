//! In-memory checkpointer (MemorySaver). Not persistent; for tests and `--memory` runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::memory::checkpointer::{
    keep_newest, new_checkpoint_id, require_session_id, CheckpointError, CheckpointListItem,
    Checkpointer,
};

/// In-memory checkpointer. Each session keeps its full history, newest last.
///
/// Cloning shares the same storage.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` by `TutorialWorkflow`.
pub struct MemorySaver<S> {
    inner: Arc<RwLock<HashMap<String, Vec<(CheckpointListItem, S)>>>>,
}

impl<S> Clone for MemorySaver<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions with at least one checkpoint.
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn load(&self, session_id: &str) -> Result<Option<S>, CheckpointError> {
        let id = require_session_id(session_id)?;
        let guard = self.inner.read().await;
        Ok(guard
            .get(id)
            .and_then(|history| history.last())
            .map(|(_, s)| s.clone()))
    }

    async fn save(&self, session_id: &str, state: &S) -> Result<String, CheckpointError> {
        let id = require_session_id(session_id)?;
        let mut guard = self.inner.write().await;
        let history = guard.entry(id.to_string()).or_default();
        let item = CheckpointListItem {
            checkpoint_id: new_checkpoint_id(),
            step: history.len() as u64 + 1,
            created_at: Utc::now(),
        };
        let checkpoint_id = item.checkpoint_id.clone();
        history.push((item, state.clone()));
        Ok(checkpoint_id)
    }

    async fn list(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let id = require_session_id(session_id)?;
        let guard = self.inner.read().await;
        let items = guard
            .get(id)
            .map(|history| history.iter().map(|(item, _)| item.clone()).collect())
            .unwrap_or_default();
        Ok(keep_newest(items, limit))
    }

    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError> {
        let id = require_session_id(session_id)?;
        self.inner.write().await.remove(id);
        Ok(())
    }
}
