//! Shutdown coordination.

use std::sync::atomic::Ordering;

use crate::error::Result;

use super::ChannelDownloader;

impl ChannelDownloader {
    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new jobs (`start_download` returns [`Error::ShuttingDown`](crate::Error::ShuttingDown))
    /// 2. Waits for running jobs, up to `download.shutdown_timeout`
    /// 3. Closes the SQLite pool when the sqlite checkpoint backend is used
    ///
    /// Jobs still running after the timeout are left to finish on their own;
    /// their checkpoints stay valid because every saved file is checkpointed.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        // 1. Stop accepting new jobs
        self.accepting_new.store(false, Ordering::SeqCst);
        self.tasks.close();
        tracing::info!(running_jobs = self.tasks.len(), "Stopped accepting new jobs");

        // 2. Wait for running jobs with timeout
        let shutdown_timeout = self.config.download.shutdown_timeout;
        match tokio::time::timeout(shutdown_timeout, self.tasks.wait()).await {
            Ok(()) => {
                tracing::info!("All running jobs finished");
            }
            Err(_) => {
                tracing::warn!(
                    running_jobs = self.tasks.len(),
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Timeout waiting for jobs to finish, proceeding with shutdown"
                );
            }
        }

        // 3. Close database connections
        if let Some(db) = &self.db {
            db.pool().close().await;
            tracing::info!("Database connections closed");
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    /// Whether new jobs are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }
}
