use crate::error::ResolutionError;
use crate::remote::{InviteCheck, JoinOutcome, JoinUpdate, PeerRef, RemoteError, RemoteSession};

use super::{ChannelReference, supergroup_encode};

const CHANNEL_ID_MARK: i64 = -1_000_000_000_000;

/// Resolve a parsed reference to the canonical channel id
///
/// Numeric ids flagged `prefer_supergroup` are looked up in their supergroup
/// encoding first and only then as written, since the remote service uses both
/// encodings for the same channel.
///
/// Resolving an invite hash the session has not joined yet imports the invite,
/// i.e. joins the channel.
pub async fn resolve(
    reference: &ChannelReference,
    remote: &dyn RemoteSession,
) -> Result<i64, ResolutionError> {
    match reference {
        ChannelReference::InviteHash(hash) => resolve_invite(hash, remote).await,
        ChannelReference::NumericId {
            id,
            prefer_supergroup: true,
        } => resolve_ambiguous_id(*id, remote).await,
        ChannelReference::NumericId { id, .. } => remote
            .get_entity(&PeerRef::Id(*id))
            .await
            .map(|entity| entity.id)
            .map_err(|e| entity_error(e, reference)),
        ChannelReference::Username(name) => {
            if name.is_empty() {
                return Err(ResolutionError::InvalidChannel {
                    reference: String::new(),
                });
            }
            remote
                .get_entity(&PeerRef::Username(name.clone()))
                .await
                .map(|entity| entity.id)
                .map_err(|e| entity_error(e, reference))
        }
    }
}

async fn resolve_invite(hash: &str, remote: &dyn RemoteSession) -> Result<i64, ResolutionError> {
    let check = remote.check_invite(hash).await.map_err(invite_error)?;
    match check {
        InviteCheck::AlreadyMember { chat_id } => {
            tracing::debug!(chat_id, "already a member of invited chat");
            Ok(chat_id)
        }
        InviteCheck::Joinable { title } => {
            tracing::info!(title = ?title, "joining channel through invite link");
            let outcome = remote.import_invite(hash).await.map_err(invite_error)?;
            joined_channel_id(&outcome).ok_or_else(|| ResolutionError::Unresolvable {
                message: "joined the channel but could not determine its id; \
                          try the channel id or username instead"
                    .to_string(),
            })
        }
    }
}

/// Channel id carried by a join outcome
///
/// The first update that names a chat decides: a channel message yields the
/// marked form of its channel id (`-1000000000000 - id`), a chat object its id
/// as reported.
fn joined_channel_id(outcome: &JoinOutcome) -> Option<i64> {
    outcome.updates.iter().find_map(|update| match update {
        JoinUpdate::ChannelMessage { channel_id } => marked_channel_id(*channel_id),
        JoinUpdate::Chat { chat_id } => Some(*chat_id),
        JoinUpdate::Other => None,
    })
}

/// Marked id of a plain channel id, `None` on overflow
fn marked_channel_id(channel_id: i64) -> Option<i64> {
    CHANNEL_ID_MARK.checked_sub(channel_id)
}

async fn resolve_ambiguous_id(id: i64, remote: &dyn RemoteSession) -> Result<i64, ResolutionError> {
    if let Some(encoded) = supergroup_encode(id) {
        match remote.get_entity(&PeerRef::Id(encoded)).await {
            Ok(entity) => return Ok(entity.id),
            Err(e) => {
                tracing::debug!(id, encoded, error = %e, "supergroup lookup failed, retrying raw id")
            }
        }
    }

    match remote.get_entity(&PeerRef::Id(id)).await {
        Ok(entity) => Ok(entity.id),
        Err(e) => {
            tracing::debug!(id, error = %e, "raw id lookup failed");
            Err(ResolutionError::Unresolvable {
                message: format!(
                    "failed to resolve channel id {}; try the full invite link or the channel username instead",
                    id
                ),
            })
        }
    }
}

fn invite_error(error: RemoteError) -> ResolutionError {
    match error {
        RemoteError::InviteExpired => ResolutionError::ExpiredInvite,
        other => ResolutionError::Unresolvable {
            message: format!("failed to resolve invite link: {}", other),
        },
    }
}

fn entity_error(error: RemoteError, reference: &ChannelReference) -> ResolutionError {
    match error {
        RemoteError::ChannelInvalid => ResolutionError::InvalidChannel {
            reference: reference.to_string(),
        },
        RemoteError::ChannelPrivate => ResolutionError::PrivateOrDenied {
            reference: reference.to_string(),
        },
        RemoteError::InviteExpired => ResolutionError::ExpiredInvite,
        other => ResolutionError::Unresolvable {
            message: format!("failed to resolve channel {}: {}", reference, other),
        },
    }
}
