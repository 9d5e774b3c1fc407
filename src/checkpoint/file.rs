use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{CheckpointKey, CheckpointStore};
use crate::error::Result;
use crate::utils::{CHECKPOINT_FILE_NAME, session_channel_dir};

/// Checkpoints as small text files inside each session/channel download directory
#[derive(Clone, Debug)]
pub struct FileCheckpointStore {
    root: PathBuf,
}

impl FileCheckpointStore {
    /// Store rooted at the download directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root download directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the checkpoint file for `key`
    pub fn path_for(&self, key: &CheckpointKey) -> PathBuf {
        session_channel_dir(&self.root, &key.session_id, key.channel_id).join(CHECKPOINT_FILE_NAME)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, key: &CheckpointKey) -> Result<Option<i64>> {
        let path = self.path_for(key);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match contents.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable checkpoint, starting from the beginning"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, key: &CheckpointKey, message_id: i64) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write-then-rename so readers never see a torn value
        let tmp = path.with_extension("txt.tmp");
        tokio::fs::write(&tmp, message_id.to_string()).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
