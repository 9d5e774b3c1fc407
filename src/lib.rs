//! # channel-dl
//!
//! Backend library for pulling the media files of messaging channels, with
//! resumable, checkpointed download jobs.
//!
//! ## Design Philosophy
//!
//! channel-dl is designed to be:
//! - **Resumable** - Every saved file advances a per-session, per-channel checkpoint
//! - **Tolerant** - One failed file never stops a job or a batch
//! - **Library-first** - The remote client is a trait; embedders bring their own
//! - **Event-driven** - Consumers subscribe to job events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use channel_dl::{ChannelDownloader, Config, MemoryRemote, SessionHandle};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ChannelDownloader::new(Config::default()).await?;
//!
//!     // Any RemoteSession implementation works here
//!     let session = SessionHandle::new("alice", Arc::new(MemoryRemote::new()));
//!
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let job_id = downloader.start_download(&session, "@some_channel").await?;
//!     let state = downloader.job_status(&job_id).await?;
//!     println!("{} files so far", state.downloaded_files);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Channel reference parsing and resolution
pub mod channel;
/// Resume points per session and channel
pub mod checkpoint;
/// Configuration types
pub mod config;
/// SQLite checkpoint backend
pub mod db;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// In-memory job state
pub mod registry;
/// The remote messaging service, as seen by the downloader
pub mod remote;
/// Authenticated sessions
pub mod session;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use checkpoint::{CheckpointKey, CheckpointStore, FileCheckpointStore};
pub use config::{CheckpointBackend, Config};
pub use db::Database;
pub use downloader::ChannelDownloader;
pub use error::{
    ApiError, DatabaseError, DownloadError, Error, ErrorDetail, ResolutionError, Result,
    ToHttpStatus,
};
pub use registry::JobRegistry;
pub use remote::{MemoryRemote, RemoteError, RemoteSession};
pub use session::{SessionHandle, SessionRegistry};
pub use types::{
    BatchDownloadSummary, ChannelListing, Event, EventKind, FileDescriptor, FileRecord, ItemOutcome,
    JobId, JobState, JobStatus,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use channel_dl::{ChannelDownloader, Config, SessionRegistry, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = ChannelDownloader::new(Config::default()).await?;
///     let _api = downloader.spawn_api_server(SessionRegistry::new());
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: ChannelDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
