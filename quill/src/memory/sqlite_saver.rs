//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::memory::checkpointer::{
    keep_newest, new_checkpoint_id, require_session_id, CheckpointError, CheckpointListItem,
    Checkpointer,
};
use crate::memory::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// SQLite-backed checkpointer. One row per save; `seq` orders a session's history.
///
/// Each operation opens its own connection inside `spawn_blocking`, so several
/// engine instances (or processes) can share one file.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer<S>>` by `TutorialWorkflow`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database and ensures the table exists. Parent
    /// directories are created as needed.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage)?;
        }
        let conn = Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS session_checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL UNIQUE,
                step INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                payload BLOB NOT NULL
            )
            "#,
            [],
        )
        .map_err(storage)?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_session_checkpoints_session ON session_checkpoints (session_id, seq)",
            [],
        )
        .map_err(storage)?;
        Ok(Self {
            db_path,
            serializer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, CheckpointError>
    where
        T: Send + 'static,
        F: FnOnce(Connection) -> Result<T, CheckpointError> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(storage)?;
            f(conn)
        })
        .await
        .map_err(storage)?
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn load(&self, session_id: &str) -> Result<Option<S>, CheckpointError> {
        let session_id = require_session_id(session_id)?.to_string();
        let payload: Option<Vec<u8>> = self
            .blocking(move |conn| {
                conn.query_row(
                    "SELECT payload FROM session_checkpoints WHERE session_id = ?1 ORDER BY seq DESC LIMIT 1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(storage)
            })
            .await?;
        payload
            .map(|bytes| self.serializer.deserialize(&bytes))
            .transpose()
    }

    async fn save(&self, session_id: &str, state: &S) -> Result<String, CheckpointError> {
        let session_id = require_session_id(session_id)?.to_string();
        let payload = self.serializer.serialize(state)?;
        let checkpoint_id = new_checkpoint_id();
        let created_at = Utc::now().timestamp_millis();
        let id = checkpoint_id.clone();
        self.blocking(move |conn| {
            let step: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM session_checkpoints WHERE session_id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .map_err(storage)?;
            conn.execute(
                r#"
                INSERT INTO session_checkpoints (session_id, checkpoint_id, step, created_at, payload)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![session_id, id, step + 1, created_at, payload],
            )
            .map_err(storage)?;
            Ok(())
        })
        .await?;
        Ok(checkpoint_id)
    }

    async fn list(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let session_id = require_session_id(session_id)?.to_string();
        let items = self
            .blocking(move |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT checkpoint_id, step, created_at FROM session_checkpoints
                         WHERE session_id = ?1 ORDER BY seq ASC",
                    )
                    .map_err(storage)?;
                let rows = stmt
                    .query_map(params![session_id], |row| {
                        let step: i64 = row.get(1)?;
                        let created_at: i64 = row.get(2)?;
                        Ok(CheckpointListItem {
                            checkpoint_id: row.get(0)?,
                            step: step.max(0) as u64,
                            created_at: millis_to_datetime(created_at),
                        })
                    })
                    .map_err(storage)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(storage)
            })
            .await?;
        Ok(keep_newest(items, limit))
    }

    async fn delete(&self, session_id: &str) -> Result<(), CheckpointError> {
        let session_id = require_session_id(session_id)?.to_string();
        self.blocking(move |conn| {
            conn.execute(
                "DELETE FROM session_checkpoints WHERE session_id = ?1",
                params![session_id],
            )
            .map_err(storage)?;
            Ok(())
        })
        .await
    }
}
