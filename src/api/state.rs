//! Application state for the API server

use crate::session::SessionRegistry;
use crate::{ChannelDownloader, Config};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// The downloader serving every request
    pub downloader: Arc<ChannelDownloader>,

    /// Bearer token to session map
    pub sessions: SessionRegistry,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        downloader: Arc<ChannelDownloader>,
        sessions: SessionRegistry,
        config: Arc<Config>,
    ) -> Self {
        Self {
            downloader,
            sessions,
            config,
        }
    }
}
