//! Job task context - shared state and status transitions.

use std::path::PathBuf;
use std::sync::Arc;

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::registry::JobWriter;
use crate::session::SessionHandle;
use crate::types::{Event, EventKind, JobId, JobStatus};

/// Shared context for a single job task, reducing parameter passing between helpers.
///
/// Owns the job's [`JobWriter`], so the task is the only writer of its state.
pub(crate) struct JobTaskContext {
    pub(crate) job: JobWriter,
    pub(crate) session: SessionHandle,
    pub(crate) channel_id: i64,
    pub(crate) download_dir: PathBuf,
    pub(crate) checkpoints: Arc<dyn CheckpointStore>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    pub(crate) retrieval_url_prefix: String,
}

impl JobTaskContext {
    pub(super) fn job_id(&self) -> &JobId {
        self.job.job_id()
    }

    pub(super) fn checkpoint_key(&self) -> CheckpointKey {
        CheckpointKey::new(self.session.session_id.clone(), self.channel_id)
    }

    pub(super) fn emit(&self, kind: EventKind) {
        self.event_tx
            .send(Event {
                job_id: self.job_id().clone(),
                session_id: self.session.session_id.clone(),
                kind,
            })
            .ok();
    }

    /// Pending -> InProgress, the only transition out of Pending.
    pub(super) async fn mark_in_progress(&self) {
        self.job.update(|s| s.status = JobStatus::InProgress).await;
        tracing::info!(
            job_id = %self.job_id(),
            channel_id = self.channel_id,
            "Job started"
        );
        self.emit(EventKind::JobStarted);
    }

    /// Mark the job as failed with an error message and emit the failure event.
    pub(super) async fn mark_failed(&self, error: &str) {
        self.job
            .update(|s| {
                s.status = JobStatus::Failed;
                s.error = Some(error.to_string());
                s.current_file = None;
            })
            .await;
        tracing::error!(
            job_id = %self.job_id(),
            channel_id = self.channel_id,
            error,
            "Job failed"
        );
        self.emit(EventKind::JobFailed {
            error: error.to_string(),
        });
    }
}
