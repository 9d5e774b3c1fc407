//! Checkpointed channel jobs: start, status and file lookup.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::channel;
use crate::error::{DownloadError, Error, Result};
use crate::session::SessionHandle;
use crate::types::{EventKind, JobId, JobState};
use crate::utils::{is_plain_file_name, session_channel_dir};

use super::ChannelDownloader;
use super::job_task::{JobTaskContext, run_job_task};

impl ChannelDownloader {
    /// Resolve a channel reference and start a job downloading its new media
    ///
    /// Returns as soon as the job is registered; progress is read through
    /// [`job_status`](Self::job_status) or [`subscribe`](Self::subscribe).
    ///
    /// Resolving an invite link the session has not joined yet joins the
    /// channel on the user's behalf.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] once shutdown started
    /// - [`Error::Resolution`] when the reference cannot be resolved
    /// - [`DownloadError::JobAlreadyActive`] while another job of this session
    ///   is still running for the same channel
    pub async fn start_download(&self, session: &SessionHandle, channel_ref: &str) -> Result<JobId> {
        self.ensure_accepting()?;
        session.ensure_ready().await?;

        let reference = channel::parse(channel_ref);
        let channel_id = channel::resolve(&reference, session.remote.as_ref()).await?;
        tracing::debug!(reference = %reference, channel_id, "channel resolved");

        self.start_job(session, channel_id).await
    }

    /// Start a job for an already resolved channel id
    ///
    /// Creates `<download_dir>/<session>/<channel>`, registers a Pending job
    /// and spawns its task.
    pub async fn start_job(&self, session: &SessionHandle, channel_id: i64) -> Result<JobId> {
        self.ensure_accepting()?;

        let download_dir = session_channel_dir(
            &self.config.download.download_dir,
            &session.session_id,
            channel_id,
        );
        tokio::fs::create_dir_all(&download_dir).await?;

        let state = JobState::new(
            JobId::generate(),
            channel_id,
            session.session_id.clone(),
            download_dir.clone(),
        );
        let writer = self.jobs.create_exclusive(state).await.map_err(|active| {
            DownloadError::JobAlreadyActive {
                job_id: active.to_string(),
                channel_id,
            }
        })?;
        let job_id = writer.job_id().clone();

        tracing::info!(
            job_id = %job_id,
            channel_id,
            session_id = %session.session_id,
            "Job queued"
        );
        self.emit_event(&job_id, session, EventKind::JobQueued { channel_id });

        let ctx = JobTaskContext {
            job: writer,
            session: session.clone(),
            channel_id,
            download_dir,
            checkpoints: self.checkpoints.clone(),
            event_tx: self.event_tx.clone(),
            retrieval_url_prefix: self.config.download.retrieval_url_prefix.clone(),
        };
        self.tasks.spawn(run_job_task(ctx));

        Ok(job_id)
    }

    /// Snapshot of a job's state
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobState> {
        self.jobs
            .get(job_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("job {}", job_id)))
    }

    /// Snapshot of a job's state, provided `session_id` owns the job
    pub async fn job_for_session(&self, session_id: &str, job_id: &JobId) -> Result<JobState> {
        let state = self.job_status(job_id).await?;
        if state.session_id != session_id {
            return Err(Error::Forbidden(format!("job {}", job_id)));
        }
        Ok(state)
    }

    /// Path of a file downloaded by a job
    ///
    /// Only files the job recorded are served, and only to the owning session.
    pub async fn job_file_path(
        &self,
        session_id: &str,
        job_id: &JobId,
        filename: &str,
    ) -> Result<PathBuf> {
        let state = self.job_for_session(session_id, job_id).await?;

        if !is_plain_file_name(filename) {
            return Err(Error::NotFound(format!("file {}", filename)));
        }
        let path = state.download_dir.join(filename);
        let recorded = state.files.iter().any(|f| f.filename == filename);
        if !recorded || !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(Error::NotFound(format!("file {}", filename)));
        }

        Ok(path)
    }

    pub(crate) fn ensure_accepting(&self) -> Result<()> {
        if self.accepting_new.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
