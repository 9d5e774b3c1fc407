//! Shared test helpers for creating ChannelDownloader instances in tests.

use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use crate::config::{CheckpointBackend, Config};
use crate::downloader::ChannelDownloader;
use crate::remote::{Entity, MemoryRemote, Message};
use crate::session::SessionHandle;
use crate::types::{JobId, JobState};

/// Canonical id of the sample channel
pub(crate) const CHANNEL_ID: i64 = -1001234567890;

/// Helper to create a test ChannelDownloader with file checkpoints.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader() -> (ChannelDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(&temp_dir);
    let downloader = ChannelDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Same as [`create_test_downloader`] but checkpoints go to SQLite.
pub(crate) async fn create_sqlite_downloader() -> (ChannelDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(&temp_dir);
    config.persistence.checkpoint_backend = CheckpointBackend::Sqlite;
    config.persistence.database_path = temp_dir.path().join("channel-dl.db");
    let downloader = ChannelDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

pub(crate) fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.shutdown_timeout = Duration::from_secs(5);
    config
}

/// The sample channel entity (`@media_archive`)
pub(crate) fn channel_entity() -> Entity {
    Entity {
        id: CHANNEL_ID,
        title: Some("Media Archive".to_string()),
        username: Some("media_archive".to_string()),
    }
}

/// Remote holding the sample channel with the given messages
pub(crate) fn remote_with(messages: Vec<Message>) -> Arc<MemoryRemote> {
    Arc::new(MemoryRemote::new().with_channel(channel_entity(), messages))
}

/// Three documents at ids 10, 20 and 30, with text messages between them
pub(crate) fn three_documents() -> Vec<Message> {
    vec![
        Message::document(10, Some("a.pdf"), "application/pdf", 100),
        Message::text(15),
        Message::document(20, Some("b.mp4"), "video/mp4", 200),
        Message::text(25),
        Message::document(30, None, "application/zip", 300),
    ]
}

pub(crate) fn session(remote: Arc<MemoryRemote>) -> SessionHandle {
    SessionHandle::new("session-1", remote)
}

/// Poll until the job reaches a terminal status
pub(crate) async fn wait_for_terminal(downloader: &ChannelDownloader, job_id: &JobId) -> JobState {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let state = downloader.job_status(job_id).await.unwrap();
            if state.status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}
