//! Authenticated sessions, keyed by bearer token
//!
//! Logging a user in to the remote service happens elsewhere; whatever does it
//! hands the resulting [`RemoteSession`] to [`SessionRegistry::register`] and
//! gives the returned token to the client.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::remote::RemoteSession;

/// An authenticated session: its id plus the remote handle acting for it
#[derive(Clone)]
pub struct SessionHandle {
    /// Stable session id; scopes download directories, checkpoints and job access
    pub session_id: String,
    /// Remote client authenticated as this session's user
    pub remote: Arc<dyn RemoteSession>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl SessionHandle {
    /// Wrap a remote handle
    pub fn new(session_id: impl Into<String>, remote: Arc<dyn RemoteSession>) -> Self {
        Self {
            session_id: session_id.into(),
            remote,
        }
    }

    /// Connect if needed and make sure the session is still logged in
    pub async fn ensure_ready(&self) -> Result<()> {
        if !self.remote.is_connected() {
            tracing::debug!(session_id = %self.session_id, "connecting remote session");
            self.remote.connect().await?;
        }
        if !self.remote.is_authorized().await? {
            return Err(Error::Unauthorized(
                "session expired, please re-authenticate".to_string(),
            ));
        }
        Ok(())
    }
}

/// Token to session map, shared by request handlers
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and issue a fresh bearer token for it
    pub async fn register(&self, handle: SessionHandle) -> String {
        let token = format!("{:032x}", rand::random::<u128>());
        self.insert(token.clone(), handle).await;
        token
    }

    /// Register a session under a caller-chosen token
    pub async fn insert(&self, token: String, handle: SessionHandle) {
        tracing::info!(session_id = %handle.session_id, "session registered");
        self.sessions.write().await.insert(token, handle);
    }

    /// Session behind a token
    pub async fn lookup(&self, token: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Forget a token; returns whether it was known
    pub async fn revoke(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(handle) = &removed {
            tracing::info!(session_id = %handle.session_id, "session revoked");
        }
        removed.is_some()
    }
}
