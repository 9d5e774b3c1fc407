//! Job task orchestration - top-level lifecycle for a single channel job.

use futures::TryStreamExt;

use crate::remote::{Message, MessageOrder};
use crate::types::{EventKind, FailedFile, FileRecord};
use crate::utils::{file_name_of, file_size, retrieval_url};

use super::context::JobTaskContext;
use super::finalization::complete_job;

/// Core job task: orchestrates the full lifecycle of a single job.
///
/// Phases:
/// 1. Transition to InProgress and make sure the session is connected
/// 2. Read the checkpoint (absent means the whole history)
/// 3. Enumerate media messages newer than the checkpoint, fixing `total_files`
/// 4. Download them one at a time in ascending id order, checkpointing each
/// 5. Mark Completed
///
/// A failure in phases 1-3 fails the job. A failed file in phase 4 is
/// recorded and skipped.
pub(crate) async fn run_job_task(ctx: JobTaskContext) {
    // Phase 1: InProgress first, so Pending only ever leads to InProgress
    ctx.mark_in_progress().await;
    if let Err(e) = ctx.session.ensure_ready().await {
        ctx.mark_failed(&format!("failed to connect: {}", e)).await;
        return;
    }

    // Phase 2: resume point
    let resume_after = match ctx.checkpoints.load(&ctx.checkpoint_key()).await {
        Ok(checkpoint) => checkpoint,
        Err(e) => {
            ctx.mark_failed(&format!("failed to read checkpoint: {}", e))
                .await;
            return;
        }
    };

    // Phase 3: enumerate, materializing the list to fix the progress denominator
    let pending = match enumerate_media(&ctx, resume_after).await {
        Ok(messages) => messages,
        Err(message) => {
            ctx.mark_failed(&message).await;
            return;
        }
    };
    let total_files = pending.len() as u64;
    ctx.job
        .update(|s| {
            s.total_files = total_files;
            s.last_checkpointed_message_id = resume_after;
        })
        .await;
    tracing::info!(
        job_id = %ctx.job_id(),
        channel_id = ctx.channel_id,
        total_files,
        resumed_after = ?resume_after,
        "Media enumerated"
    );
    ctx.emit(EventKind::FilesEnumerated {
        total_files,
        resumed_after: resume_after,
    });

    // Phase 4: strictly sequential downloads
    for message in &pending {
        download_one(&ctx, message, total_files).await;
    }

    // Phase 5
    complete_job(ctx).await;
}

/// Media-bearing messages strictly newer than `resume_after`, oldest first.
async fn enumerate_media(
    ctx: &JobTaskContext,
    resume_after: Option<i64>,
) -> Result<Vec<Message>, String> {
    ctx.session
        .remote
        .iter_messages(
            ctx.channel_id,
            resume_after.unwrap_or(0),
            MessageOrder::Ascending,
        )
        .try_filter(|message| futures::future::ready(message.has_downloadable_media()))
        .try_collect()
        .await
        .map_err(|e| format!("failed to list channel messages: {}", e))
}

/// Download one message's media and checkpoint it; failures are recorded, not raised.
async fn download_one(ctx: &JobTaskContext, message: &Message, total_files: u64) {
    let message_id = message.id;
    ctx.job
        .update(|s| s.current_file = Some(format!("Message ID {}", message_id)))
        .await;

    let path = match ctx
        .session
        .remote
        .download_media(message, &ctx.download_dir)
        .await
    {
        Ok(path) => path,
        Err(e) => {
            let error = e.to_string();
            tracing::warn!(
                job_id = %ctx.job_id(),
                message_id,
                error = %error,
                "File download failed, continuing with next file"
            );
            ctx.job
                .update(|s| {
                    s.current_file = None;
                    s.failed_files.push(FailedFile {
                        message_id,
                        error: error.clone(),
                    });
                })
                .await;
            ctx.emit(EventKind::FileFailed { message_id, error });
            return;
        }
    };

    let filename = file_name_of(&path);
    let record = FileRecord {
        message_id,
        filename: filename.clone(),
        size_bytes: file_size(&path).await,
        retrieval_url: retrieval_url(&ctx.retrieval_url_prefix, ctx.job_id().as_str(), &filename),
        storage_path: path,
    };
    let progress = ctx
        .job
        .update(|s| {
            s.files.push(record);
            s.downloaded_files += 1;
            s.progress = s.downloaded_files as f64 / total_files as f64 * 100.0;
            s.current_file = None;
            s.progress
        })
        .await;

    // checkpoint after every saved file
    match ctx.checkpoints.save(&ctx.checkpoint_key(), message_id).await {
        Ok(()) => {
            ctx.job
                .update(|s| s.last_checkpointed_message_id = Some(message_id))
                .await;
        }
        Err(e) => {
            tracing::warn!(
                job_id = %ctx.job_id(),
                message_id,
                error = %e,
                "Failed to write checkpoint"
            );
        }
    }

    tracing::debug!(job_id = %ctx.job_id(), message_id, filename = %filename, progress, "File downloaded");
    ctx.emit(EventKind::FileDownloaded {
        message_id,
        filename,
        progress,
    });
}
