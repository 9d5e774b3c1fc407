//! Core downloader implementation split into focused submodules.
//!
//! The `ChannelDownloader` struct and its methods are organized by domain:
//! - [`jobs`] - Starting checkpointed channel jobs, status and file lookup
//! - [`job_task`] - The background routine driving one job
//! - [`listing`] - Read-only enumeration of a channel's media
//! - [`selective`] - Downloading specific messages, outside any job
//! - [`lifecycle`] - Shutdown coordination

mod job_task;
mod jobs;
mod lifecycle;
mod listing;
mod selective;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio_util::task::TaskTracker;

use crate::checkpoint::{CheckpointStore, FileCheckpointStore};
use crate::config::{CheckpointBackend, Config};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::registry::JobRegistry;
use crate::session::SessionHandle;
use crate::types::{Event, EventKind, JobId};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct ChannelDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Job states, shared between job tasks and status readers
    pub(crate) jobs: JobRegistry,
    /// Where job tasks read and write resume points
    pub(crate) checkpoints: Arc<dyn CheckpointStore>,
    /// SQLite handle when the sqlite checkpoint backend is configured
    pub(crate) db: Option<Arc<Database>>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Background job tasks, awaited on shutdown
    pub(crate) tasks: TaskTracker,
    /// Cleared once shutdown starts; new jobs are refused afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl ChannelDownloader {
    /// Create a new ChannelDownloader instance
    ///
    /// Validates the configuration, creates the download directory and opens
    /// the configured checkpoint backend (running migrations for SQLite).
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Self::create_download_dir(&config).await?;

        let (checkpoints, db): (Arc<dyn CheckpointStore>, Option<Arc<Database>>) =
            match config.persistence.checkpoint_backend {
                CheckpointBackend::File => (
                    Arc::new(FileCheckpointStore::new(config.download.download_dir.clone())),
                    None,
                ),
                CheckpointBackend::Sqlite => {
                    let db = Arc::new(Database::new(&config.persistence.database_path).await?);
                    (db.clone(), Some(db))
                }
            };

        tracing::info!(
            download_dir = %config.download.download_dir.display(),
            checkpoint_backend = ?config.persistence.checkpoint_backend,
            "Channel downloader initialized"
        );

        Ok(Self::assemble(config, checkpoints, db))
    }

    /// Create a downloader that keeps checkpoints in a caller-provided store
    ///
    /// `persistence.checkpoint_backend` is ignored.
    pub async fn with_checkpoint_store(
        config: Config,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Result<Self> {
        config.validate()?;
        Self::create_download_dir(&config).await?;
        Ok(Self::assemble(config, checkpoints, None))
    }

    async fn create_download_dir(config: &Config) -> Result<()> {
        tokio::fs::create_dir_all(&config.download.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download.download_dir.display(),
                        e
                    ),
                ))
            })
    }

    fn assemble(
        config: Config,
        checkpoints: Arc<dyn CheckpointStore>,
        db: Option<Arc<Database>>,
    ) -> Self {
        let (event_tx, _rx) = tokio::sync::broadcast::channel(config.event_buffer);
        Self {
            config: Arc::new(config),
            jobs: JobRegistry::new(),
            checkpoints,
            db,
            event_tx,
            tasks: TaskTracker::new(),
            accepting_new: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscribe to job events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events
    /// independently; one that falls behind by more than `event_buffer` events
    /// receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use channel_dl::{ChannelDownloader, Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = ChannelDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(job_id = %event.job_id, event = event.kind.name(), "job event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The job registry backing status queries
    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    /// Emit an event to all subscribers
    ///
    /// Events without subscribers are dropped.
    pub(crate) fn emit_event(&self, job_id: &JobId, session: &SessionHandle, kind: EventKind) {
        self.event_tx
            .send(Event {
                job_id: job_id.clone(),
                session_id: session.session_id.clone(),
                kind,
            })
            .ok();
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on `server.api.bind_address` and authenticates
    /// requests against `sessions`.
    pub fn spawn_api_server(
        &self,
        sessions: crate::session::SessionRegistry,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = Arc::new(self.clone());
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, sessions, config).await })
    }
}
