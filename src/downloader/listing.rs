//! Read-only channel listing.

use futures::TryStreamExt;

use crate::channel;
use crate::error::{Error, ResolutionError, Result};
use crate::remote::{Message, MessageOrder, PeerRef, RemoteError};
use crate::session::SessionHandle;
use crate::types::{ChannelListing, FileDescriptor};
use crate::utils::{media_filename, media_mime_type};

use super::ChannelDownloader;

impl ChannelDownloader {
    /// Resolve a channel reference and describe all of its media
    pub async fn list_channel_files(
        &self,
        session: &SessionHandle,
        channel_ref: &str,
    ) -> Result<ChannelListing> {
        session.ensure_ready().await?;
        let reference = channel::parse(channel_ref);
        let channel_id = channel::resolve(&reference, session.remote.as_ref()).await?;

        // the name is cosmetic; a failed lookup leaves it empty
        let channel_name = match session.remote.get_entity(&PeerRef::Id(channel_id)).await {
            Ok(entity) => entity.display_name(),
            Err(e) => {
                tracing::debug!(channel_id, error = %e, "channel name lookup failed");
                None
            }
        };

        let files = self.list_files(session, channel_id).await?;
        Ok(ChannelListing {
            channel_id,
            channel_name,
            total_count: files.len(),
            files,
        })
    }

    /// Describe every media message of a channel, oldest first
    ///
    /// Touches neither checkpoints nor the job registry.
    pub async fn list_files(
        &self,
        session: &SessionHandle,
        channel_id: i64,
    ) -> Result<Vec<FileDescriptor>> {
        session
            .remote
            .iter_messages(channel_id, 0, MessageOrder::Ascending)
            .try_filter_map(|message| futures::future::ready(Ok(describe(&message))))
            .try_collect()
            .await
            .map_err(|e| listing_error(e, channel_id))
    }
}

fn describe(message: &Message) -> Option<FileDescriptor> {
    let media = message.downloadable_media()?;
    Some(FileDescriptor {
        message_id: message.id,
        filename: media_filename(message.id, media),
        size_bytes: media.size_bytes,
        mime_type: media_mime_type(media),
        timestamp: message.date,
        is_video: media.attributes.is_video,
        is_photo: media.kind == crate::remote::MediaKind::Photo,
    })
}

fn listing_error(error: RemoteError, channel_id: i64) -> Error {
    match error {
        RemoteError::ChannelInvalid => Error::Resolution(ResolutionError::InvalidChannel {
            reference: channel_id.to_string(),
        }),
        RemoteError::ChannelPrivate => Error::Resolution(ResolutionError::PrivateOrDenied {
            reference: channel_id.to_string(),
        }),
        other => Error::Enumeration {
            channel_id,
            message: other.to_string(),
        },
    }
}
