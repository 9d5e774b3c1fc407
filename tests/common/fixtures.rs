//! Sample channels, remotes and downloaders

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use channel_dl::config::CheckpointBackend;
use channel_dl::remote::{Entity, Message};
use channel_dl::{ChannelDownloader, Config, MemoryRemote, SessionHandle};

/// Canonical (supergroup-encoded) id of the sample channel
pub const CHANNEL_ID: i64 = -1009876543210;

/// Plain id of the sample channel, as carried by join updates
pub const PLAIN_CHANNEL_ID: i64 = 9876543210;

/// The sample channel entity (`@field_notes`)
pub fn channel() -> Entity {
    Entity {
        id: CHANNEL_ID,
        title: Some("Field Notes".to_string()),
        username: Some("field_notes".to_string()),
    }
}

/// Documents at ids 10, 20 and 30 with chatter between them
pub fn documents() -> Vec<Message> {
    vec![
        Message::document(10, Some("survey.pdf"), "application/pdf", 1_000),
        Message::text(11),
        Message::document(20, Some("site.mp4"), "video/mp4", 2_000),
        Message::text(21),
        Message::document(30, None, "application/zip", 3_000),
    ]
}

/// Remote holding the sample channel
pub fn remote(messages: Vec<Message>) -> Arc<MemoryRemote> {
    Arc::new(MemoryRemote::new().with_channel(channel(), messages))
}

/// Remote whose transfers take `delay` each
pub fn slow_remote(messages: Vec<Message>, delay: Duration) -> Arc<MemoryRemote> {
    Arc::new(
        MemoryRemote::new()
            .with_channel(channel(), messages)
            .with_transfer_delay(delay),
    )
}

/// Session `alice` acting through `remote`
pub fn alice(remote: Arc<MemoryRemote>) -> SessionHandle {
    SessionHandle::new("alice", remote)
}

/// Config rooted in `root`, using the given checkpoint backend
pub fn config_in(root: &Path, backend: CheckpointBackend) -> Config {
    let mut config = Config::default();
    config.download.download_dir = root.join("downloads");
    config.download.shutdown_timeout = Duration::from_secs(5);
    config.persistence.checkpoint_backend = backend;
    config.persistence.database_path = root.join("checkpoints.db");
    config
}

/// Downloader rooted in `root`
pub async fn downloader_in(root: &Path, backend: CheckpointBackend) -> ChannelDownloader {
    ChannelDownloader::new(config_in(root, backend))
        .await
        .expect("downloader should start")
}
