//! Downloading specific messages, independent of jobs and checkpoints.

use std::path::PathBuf;

use crate::channel;
use crate::error::{DownloadError, Result};
use crate::session::SessionHandle;
use crate::types::{BatchDownloadSummary, ItemOutcome};
use crate::utils::{file_name_of, file_size, session_channel_dir};

use super::ChannelDownloader;

impl ChannelDownloader {
    /// Resolve a channel reference and download one message's media
    pub async fn download_single(
        &self,
        session: &SessionHandle,
        channel_ref: &str,
        message_id: i64,
    ) -> Result<PathBuf> {
        session.ensure_ready().await?;
        let channel_id =
            channel::resolve(&channel::parse(channel_ref), session.remote.as_ref()).await?;
        self.download_message(session, channel_id, message_id).await
    }

    /// Resolve a channel reference and download several messages
    ///
    /// Each id is attempted independently; the summary carries one outcome
    /// per requested id, in request order.
    pub async fn download_many(
        &self,
        session: &SessionHandle,
        channel_ref: &str,
        message_ids: &[i64],
    ) -> Result<BatchDownloadSummary> {
        session.ensure_ready().await?;
        let channel_id =
            channel::resolve(&channel::parse(channel_ref), session.remote.as_ref()).await?;
        let outcomes = self
            .download_messages(session, channel_id, message_ids)
            .await;
        Ok(BatchDownloadSummary::from_outcomes(outcomes))
    }

    /// Download one message's media into the session/channel directory
    ///
    /// # Errors
    ///
    /// - [`DownloadError::MessageNotFound`] when the message does not exist
    /// - [`DownloadError::NoMedia`] when it carries no document or photo
    /// - [`DownloadError::Transfer`] when fetching or storing fails
    pub async fn download_message(
        &self,
        session: &SessionHandle,
        channel_id: i64,
        message_id: i64,
    ) -> Result<PathBuf> {
        let message = session
            .remote
            .get_message(channel_id, message_id)
            .await?
            .ok_or(DownloadError::MessageNotFound { message_id })?;
        if !message.has_downloadable_media() {
            return Err(DownloadError::NoMedia { message_id }.into());
        }

        let dir = session_channel_dir(
            &self.config.download.download_dir,
            &session.session_id,
            channel_id,
        );
        tokio::fs::create_dir_all(&dir).await?;

        let path = session
            .remote
            .download_media(&message, &dir)
            .await
            .map_err(|e| DownloadError::Transfer {
                message_id,
                reason: e.to_string(),
            })?;
        tracing::info!(channel_id, message_id, path = %path.display(), "Message downloaded");
        Ok(path)
    }

    /// Download several messages; a failure on one id never stops the others
    pub async fn download_messages(
        &self,
        session: &SessionHandle,
        channel_id: i64,
        message_ids: &[i64],
    ) -> Vec<ItemOutcome> {
        let mut outcomes = Vec::with_capacity(message_ids.len());
        for &message_id in message_ids {
            let outcome = match self.download_message(session, channel_id, message_id).await {
                Ok(path) => {
                    let size = file_size(&path).await;
                    ItemOutcome::saved(message_id, file_name_of(&path), size, path)
                }
                Err(e) => {
                    tracing::warn!(channel_id, message_id, error = %e, "Message download failed");
                    ItemOutcome::failed(message_id, e.to_string())
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
