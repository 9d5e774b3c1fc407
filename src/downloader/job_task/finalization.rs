//! Job finalization - set the final status and emit the completion event.

use crate::types::{EventKind, JobStatus};

use super::context::JobTaskContext;

/// Mark the job Completed at 100%.
///
/// Files that failed along the way do not change the outcome; they show up as
/// `downloaded_files < total_files` and in `failed_files`.
pub(super) async fn complete_job(ctx: JobTaskContext) {
    let (downloaded_files, total_files, failed) = ctx
        .job
        .update(|s| {
            s.status = JobStatus::Completed;
            s.progress = 100.0;
            s.current_file = None;
            (s.downloaded_files, s.total_files, s.failed_files.len())
        })
        .await;

    if failed > 0 {
        tracing::warn!(
            job_id = %ctx.job_id(),
            channel_id = ctx.channel_id,
            downloaded_files,
            total_files,
            failed,
            "Job completed with some failed files"
        );
    } else {
        tracing::info!(
            job_id = %ctx.job_id(),
            channel_id = ctx.channel_id,
            downloaded_files,
            total_files,
            "Job completed"
        );
    }

    ctx.emit(EventKind::JobCompleted {
        downloaded_files,
        total_files,
    });
}
