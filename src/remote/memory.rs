//! In-memory [`RemoteSession`] for tests and local development

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::stream;

use super::{
    Entity, InviteCheck, JoinOutcome, Message, MessageOrder, MessageStream, PeerRef, RemoteError,
    RemoteSession,
};
use crate::utils::media_filename;

/// How a registered invite hash behaves
#[derive(Clone, Debug)]
pub enum MemoryInvite {
    /// The session already belongs to the chat with this id
    AlreadyMember(i64),
    /// The invite can be joined, producing this outcome
    Joinable(JoinOutcome),
    /// The invite has expired
    Expired,
}

#[derive(Default)]
struct MemoryState {
    authorized: bool,
    connect_fails: bool,
    entities: HashMap<PeerRef, Entity>,
    private: HashSet<PeerRef>,
    channels: HashMap<i64, Vec<Message>>,
    invites: HashMap<String, MemoryInvite>,
    failing_downloads: HashSet<i64>,
    failing_enumerations: HashSet<i64>,
    transfer_delay: Option<Duration>,
    downloads: Vec<i64>,
    entity_lookups: Vec<PeerRef>,
    joined: Vec<String>,
}

/// A remote service held entirely in memory
///
/// Channels, invites and failures are configured up front (or mutated while
/// jobs run); downloads write placeholder bytes of the declared size.
pub struct MemoryRemote {
    connected: AtomicBool,
    state: Mutex<MemoryState>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// An authorized, disconnected remote with no channels
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            state: Mutex::new(MemoryState {
                authorized: true,
                ..MemoryState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a channel reachable by its id and username
    pub fn with_channel(self, entity: Entity, messages: Vec<Message>) -> Self {
        {
            let mut state = self.state();
            state.entities.insert(PeerRef::Id(entity.id), entity.clone());
            if let Some(username) = &entity.username {
                state
                    .entities
                    .insert(PeerRef::Username(username.clone()), entity.clone());
            }
            state.channels.insert(entity.id, messages);
        }
        self
    }

    /// Make an extra identifier resolve to `entity`
    pub fn with_alias(self, peer: PeerRef, entity: Entity) -> Self {
        self.state().entities.insert(peer, entity);
        self
    }

    /// Make lookups of `peer` fail as private
    pub fn with_private(self, peer: PeerRef) -> Self {
        self.state().private.insert(peer);
        self
    }

    /// Register an invite hash
    pub fn with_invite(self, hash: &str, invite: MemoryInvite) -> Self {
        self.state().invites.insert(hash.to_string(), invite);
        self
    }

    /// Sleep this long inside every media transfer
    pub fn with_transfer_delay(self, delay: Duration) -> Self {
        self.state().transfer_delay = Some(delay);
        self
    }

    /// Append a message to a registered channel
    pub fn push_message(&self, channel_id: i64, message: Message) {
        self.state()
            .channels
            .entry(channel_id)
            .or_default()
            .push(message);
    }

    /// Make transfers of this message fail
    pub fn fail_download(&self, message_id: i64) {
        self.state().failing_downloads.insert(message_id);
    }

    /// Make enumeration of this channel fail
    pub fn fail_enumeration(&self, channel_id: i64) {
        self.state().failing_enumerations.insert(channel_id);
    }

    /// Make `connect` fail
    pub fn fail_connect(&self) {
        self.state().connect_fails = true;
    }

    /// Change the authorization flag
    pub fn set_authorized(&self, authorized: bool) {
        self.state().authorized = authorized;
    }

    /// Drop the transport connection
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Message ids whose media was transferred, in transfer order
    pub fn downloads(&self) -> Vec<i64> {
        self.state().downloads.clone()
    }

    /// Every identifier passed to `get_entity`, in call order
    pub fn entity_lookups(&self) -> Vec<PeerRef> {
        self.state().entity_lookups.clone()
    }

    /// Invite hashes joined through `import_invite`
    pub fn joined(&self) -> Vec<String> {
        self.state().joined.clone()
    }
}

#[async_trait::async_trait]
impl RemoteSession for MemoryRemote {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), RemoteError> {
        if self.state().connect_fails {
            return Err(RemoteError::Rpc("connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_authorized(&self) -> Result<bool, RemoteError> {
        Ok(self.state().authorized)
    }

    async fn get_entity(&self, peer: &PeerRef) -> Result<Entity, RemoteError> {
        let mut state = self.state();
        state.entity_lookups.push(peer.clone());
        if state.private.contains(peer) {
            return Err(RemoteError::ChannelPrivate);
        }
        state
            .entities
            .get(peer)
            .cloned()
            .ok_or(RemoteError::ChannelInvalid)
    }

    fn iter_messages(
        &self,
        channel_id: i64,
        min_id: i64,
        order: MessageOrder,
    ) -> MessageStream<'_> {
        let state = self.state();
        if state.failing_enumerations.contains(&channel_id) {
            return Box::pin(stream::iter(vec![Err(RemoteError::Rpc(
                "history request timed out".to_string(),
            ))]));
        }
        let Some(messages) = state.channels.get(&channel_id) else {
            return Box::pin(stream::iter(vec![Err(RemoteError::ChannelInvalid)]));
        };

        let mut selected: Vec<Message> = messages
            .iter()
            .filter(|m| m.id > min_id)
            .cloned()
            .collect();
        selected.sort_by_key(|m| m.id);
        if order == MessageOrder::Descending {
            selected.reverse();
        }
        Box::pin(stream::iter(selected.into_iter().map(Ok)))
    }

    async fn get_message(
        &self,
        channel_id: i64,
        message_id: i64,
    ) -> Result<Option<Message>, RemoteError> {
        let state = self.state();
        let messages = state
            .channels
            .get(&channel_id)
            .ok_or(RemoteError::ChannelInvalid)?;
        Ok(messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn download_media(
        &self,
        message: &Message,
        dest_dir: &Path,
    ) -> Result<PathBuf, RemoteError> {
        let delay = self.state().transfer_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state().failing_downloads.contains(&message.id) {
            return Err(RemoteError::Rpc("file transfer interrupted".to_string()));
        }
        let media = message
            .downloadable_media()
            .ok_or_else(|| RemoteError::Rpc("message has no media".to_string()))?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(media_filename(message.id, media));
        let size = usize::try_from(media.size_bytes).unwrap_or(0);
        tokio::fs::write(&path, vec![0u8; size]).await?;

        self.state().downloads.push(message.id);
        Ok(path)
    }

    async fn check_invite(&self, hash: &str) -> Result<InviteCheck, RemoteError> {
        match self.state().invites.get(hash) {
            Some(MemoryInvite::AlreadyMember(chat_id)) => Ok(InviteCheck::AlreadyMember {
                chat_id: *chat_id,
            }),
            Some(MemoryInvite::Joinable(_)) => Ok(InviteCheck::Joinable { title: None }),
            Some(MemoryInvite::Expired) => Err(RemoteError::InviteExpired),
            None => Err(RemoteError::Rpc("INVITE_HASH_INVALID".to_string())),
        }
    }

    async fn import_invite(&self, hash: &str) -> Result<JoinOutcome, RemoteError> {
        let mut state = self.state();
        match state.invites.get(hash).cloned() {
            Some(MemoryInvite::Joinable(outcome)) => {
                state.joined.push(hash.to_string());
                Ok(outcome)
            }
            Some(MemoryInvite::Expired) => Err(RemoteError::InviteExpired),
            Some(MemoryInvite::AlreadyMember(_)) => {
                Err(RemoteError::Rpc("USER_ALREADY_PARTICIPANT".to_string()))
            }
            None => Err(RemoteError::Rpc("INVITE_HASH_INVALID".to_string())),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn channel() -> Entity {
        Entity {
            id: -1001,
            title: Some("Media".into()),
            username: Some("media".into()),
        }
    }

    #[tokio::test]
    async fn enumeration_is_filtered_and_ordered() {
        let remote = MemoryRemote::new().with_channel(
            channel(),
            vec![Message::text(30), Message::photo(10, 1), Message::text(20)],
        );

        let ids: Vec<i64> = remote
            .iter_messages(-1001, 10, MessageOrder::Ascending)
            .map(|m| m.unwrap().id)
            .collect()
            .await;
        assert_eq!(ids, vec![20, 30]);

        let desc: Vec<i64> = remote
            .iter_messages(-1001, 0, MessageOrder::Descending)
            .map(|m| m.unwrap().id)
            .collect()
            .await;
        assert_eq!(desc, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn download_writes_declared_size() {
        let dir = tempfile::tempdir().unwrap();
        let remote = MemoryRemote::new();
        let msg = Message::document(5, Some("a.bin"), "application/octet-stream", 12);

        let path = remote.download_media(&msg, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("a.bin"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 12);
        assert_eq!(remote.downloads(), vec![5]);
    }

    #[tokio::test]
    async fn entity_lookup_by_username_and_private() {
        let remote = MemoryRemote::new()
            .with_channel(channel(), vec![])
            .with_private(PeerRef::Username("secret".into()));

        let found = remote
            .get_entity(&PeerRef::Username("media".into()))
            .await
            .unwrap();
        assert_eq!(found.id, -1001);
        assert!(matches!(
            remote.get_entity(&PeerRef::Username("secret".into())).await,
            Err(RemoteError::ChannelPrivate)
        ));
        assert_eq!(remote.entity_lookups().len(), 2);
    }
}
