//! Remote messaging service boundary
//!
//! The download engine never speaks the wire protocol itself. Everything it
//! needs from the remote service goes through [`RemoteSession`]: connection
//! checks, entity lookup, message enumeration, media transfer and invite
//! handling. Embedders provide the implementation; tests use an in-memory fake.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod memory;

pub use memory::{MemoryInvite, MemoryRemote};

/// Errors reported by a [`RemoteSession`] implementation
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The channel identifier does not name a valid channel
    #[error("invalid channel")]
    ChannelInvalid,

    /// The channel exists but is private or the session lacks access
    #[error("channel is private or access denied")]
    ChannelPrivate,

    /// The invite link hash has expired
    #[error("invite link has expired")]
    InviteExpired,

    /// The session is not (or no longer) authorized with the remote service
    #[error("session is not authorized")]
    NotAuthorized,

    /// Any other RPC-level failure, carrying the remote's message
    #[error("{0}")]
    Rpc(String),

    /// Local I/O failure while saving media
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identifier accepted by [`RemoteSession::get_entity`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PeerRef {
    /// Numeric id, in whichever encoding the caller chose
    Id(i64),
    /// Public username without the leading `@`
    Username(String),
}

impl std::fmt::Display for PeerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerRef::Id(id) => write!(f, "{}", id),
            PeerRef::Username(name) => write!(f, "@{}", name),
        }
    }
}

/// A resolved channel, group or user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical numeric id as reported by the remote service
    pub id: i64,
    /// Display title (channels and groups)
    pub title: Option<String>,
    /// Public username, when the entity has one
    pub username: Option<String>,
}

impl Entity {
    /// Human-readable name: the title, falling back to the username
    pub fn display_name(&self) -> Option<String> {
        self.title.clone().or_else(|| self.username.clone())
    }
}

/// Enumeration order for [`RemoteSession::iter_messages`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageOrder {
    /// Oldest first (chronological)
    Ascending,
    /// Newest first
    Descending,
}

/// Kind of attachment carried by a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Generic document (files, videos, audio, stickers, ...)
    Document,
    /// Compressed photo
    Photo,
    /// Anything without downloadable bytes (web previews, polls, locations)
    Other,
}

/// Attributes the remote service attaches to a media object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttributes {
    /// Declared file name
    pub file_name: Option<String>,
    /// Whether the document carries a video attribute
    pub is_video: bool,
}

/// Media attached to a message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Attachment kind
    pub kind: MediaKind,
    /// Size in bytes as declared by the remote service
    pub size_bytes: u64,
    /// Declared MIME type
    pub mime_type: Option<String>,
    /// Name and type attributes
    pub attributes: MediaAttributes,
}

impl Media {
    /// Whether this attachment can be saved to disk
    pub fn is_downloadable(&self) -> bool {
        matches!(self.kind, MediaKind::Document | MediaKind::Photo)
    }
}

/// A channel message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message id, unique and increasing within a channel
    pub id: i64,
    /// Send time
    pub date: Option<DateTime<Utc>>,
    /// Attachment, if any
    pub media: Option<Media>,
}

impl Message {
    /// A message without attachment
    pub fn text(id: i64) -> Self {
        Self {
            id,
            date: None,
            media: None,
        }
    }

    /// A message carrying a document
    pub fn document(id: i64, file_name: Option<&str>, mime_type: &str, size_bytes: u64) -> Self {
        Self {
            id,
            date: None,
            media: Some(Media {
                kind: MediaKind::Document,
                size_bytes,
                mime_type: Some(mime_type.to_string()),
                attributes: MediaAttributes {
                    file_name: file_name.map(String::from),
                    is_video: mime_type.starts_with("video/"),
                },
            }),
        }
    }

    /// A message carrying a photo
    pub fn photo(id: i64, size_bytes: u64) -> Self {
        Self {
            id,
            date: None,
            media: Some(Media {
                kind: MediaKind::Photo,
                size_bytes,
                mime_type: None,
                attributes: MediaAttributes::default(),
            }),
        }
    }

    /// Set the send time
    pub fn sent_at(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// The attachment, if it is a document or photo
    pub fn downloadable_media(&self) -> Option<&Media> {
        self.media.as_ref().filter(|m| m.is_downloadable())
    }

    /// Whether the message carries a document or photo
    pub fn has_downloadable_media(&self) -> bool {
        self.downloadable_media().is_some()
    }
}

/// Result of checking an invite hash
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InviteCheck {
    /// The session already belongs to the target chat
    AlreadyMember {
        /// Id of the chat the invite points to
        chat_id: i64,
    },
    /// The invite is valid and can be joined
    Joinable {
        /// Title of the chat, if the remote exposes it
        title: Option<String>,
    },
}

/// One update returned after joining through an invite
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinUpdate {
    /// A message posted in a channel (carries the plain channel id)
    ChannelMessage {
        /// Plain (not supergroup-encoded) channel id
        channel_id: i64,
    },
    /// A chat object
    Chat {
        /// Chat id as reported
        chat_id: i64,
    },
    /// Update types irrelevant to id extraction
    Other,
}

/// Outcome of [`RemoteSession::import_invite`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Updates delivered with the join, in remote order
    pub updates: Vec<JoinUpdate>,
}

/// Lazy message sequence returned by [`RemoteSession::iter_messages`]
pub type MessageStream<'a> = BoxStream<'a, Result<Message, RemoteError>>;

/// An authenticated handle to the remote messaging service
#[async_trait::async_trait]
pub trait RemoteSession: Send + Sync {
    /// Whether the transport is currently connected
    fn is_connected(&self) -> bool;

    /// Open the transport connection
    async fn connect(&self) -> Result<(), RemoteError>;

    /// Whether the session is logged in
    async fn is_authorized(&self) -> Result<bool, RemoteError>;

    /// Resolve an identifier to an entity
    async fn get_entity(&self, peer: &PeerRef) -> Result<Entity, RemoteError>;

    /// Lazily enumerate messages with id strictly greater than `min_id`
    fn iter_messages(&self, channel_id: i64, min_id: i64, order: MessageOrder)
    -> MessageStream<'_>;

    /// Fetch one message, `None` when it does not exist
    async fn get_message(
        &self,
        channel_id: i64,
        message_id: i64,
    ) -> Result<Option<Message>, RemoteError>;

    /// Save the message's media into `dest_dir`, returning the stored file path
    async fn download_media(&self, message: &Message, dest_dir: &Path)
    -> Result<PathBuf, RemoteError>;

    /// Inspect an invite hash without joining
    async fn check_invite(&self, hash: &str) -> Result<InviteCheck, RemoteError>;

    /// Join the chat behind an invite hash
    async fn import_invite(&self, hash: &str) -> Result<JoinOutcome, RemoteError>;
}
