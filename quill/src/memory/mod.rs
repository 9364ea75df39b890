//! # Memory: session checkpoints
//!
//! A [`Checkpointer`] persists the whole [`SessionState`](crate::state::SessionState)
//! at the end of each turn, keyed by session id, and hands the latest one back at
//! the start of the next turn. Each save is a new checkpoint; history is kept.
//!
//! | Type            | Persistence | Use case                 |
//! |-----------------|-------------|--------------------------|
//! | [`MemorySaver`] | In-memory   | Tests, `--memory` runs   |
//! | [`SqliteSaver`] | SQLite file | CLI default, resumable   |
//!
//! [`JsonSerializer`] is required for `SqliteSaver` (state must be
//! `Serialize + DeserializeOwned`).

mod checkpointer;
mod memory_saver;
mod serializer;
mod sqlite_saver;

pub use checkpointer::{CheckpointError, CheckpointListItem, Checkpointer};
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;
