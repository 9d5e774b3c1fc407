//! Durable resume points, one per (session, channel)
//!
//! A checkpoint is the id of the highest message whose media has been saved.
//! It is read once when a job starts and overwritten after every saved file.
//!
//! Two backends exist:
//! - [`FileCheckpointStore`] keeps `last_message_id.txt` next to the downloads
//! - [`Database`](crate::db::Database) keeps a `checkpoints` table in SQLite

use async_trait::async_trait;

use crate::error::Result;

mod file;

pub use file::FileCheckpointStore;

/// Key of a checkpoint record
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CheckpointKey {
    /// Owning session
    pub session_id: String,
    /// Canonical channel id
    pub channel_id: i64,
}

impl CheckpointKey {
    /// Build a key
    pub fn new(session_id: impl Into<String>, channel_id: i64) -> Self {
        Self {
            session_id: session_id.into(),
            channel_id,
        }
    }
}

/// Storage for checkpoints
///
/// # Examples
///
/// ```no_run
/// use channel_dl::checkpoint::{CheckpointKey, CheckpointStore, FileCheckpointStore};
///
/// # #[tokio::main]
/// # async fn main() -> channel_dl::Result<()> {
/// let store = FileCheckpointStore::new("downloads");
/// let key = CheckpointKey::new("session-1", -1001234567890);
///
/// store.save(&key, 30).await?;
/// assert_eq!(store.load(&key).await?, Some(30));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last saved message id, `None` when the pair has no progress yet
    async fn load(&self, key: &CheckpointKey) -> Result<Option<i64>>;

    /// Replace the checkpoint with `message_id`
    ///
    /// Must not leave a partially written value behind.
    async fn save(&self, key: &CheckpointKey, message_id: i64) -> Result<()>;
}
