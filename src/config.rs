//! Configuration types for channel-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Download behavior configuration (directories, retrieval URLs, shutdown)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Root download directory (default: "./downloads")
    ///
    /// Files land in `<download_dir>/<session_id>/<channel_id>/`.
    #[serde(default = "default_download_dir")]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,

    /// Prefix of the URL a job's files are served under (default: "/api/v1/jobs")
    #[serde(default = "default_retrieval_url_prefix")]
    pub retrieval_url_prefix: String,

    /// How long shutdown waits for running jobs (default: 30 seconds)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub shutdown_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            retrieval_url_prefix: default_retrieval_url_prefix(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Where checkpoints are stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// `last_message_id.txt` inside each session/channel download directory
    #[default]
    File,
    /// A `checkpoints` table in the SQLite database at `database_path`
    Sqlite,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Checkpoint backend (default: file)
    #[serde(default)]
    pub checkpoint_backend: CheckpointBackend,

    /// Database path, used by the sqlite backend (default: "./channel-dl.db")
    #[serde(default = "default_database_path")]
    #[schema(value_type = String)]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            checkpoint_backend: CheckpointBackend::default(),
            database_path: default_database_path(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: the local frontend dev servers)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

/// Main configuration for [`ChannelDownloader`](crate::ChannelDownloader)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Checkpoint storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// API settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,

    /// Capacity of the job event broadcast channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download: DownloadConfig::default(),
            persistence: PersistenceConfig::default(),
            server: ServerIntegrationConfig::default(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Root download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Reject settings the downloader cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download directory must not be empty".to_string(),
                key: Some("download_dir".to_string()),
            });
        }
        if self.event_buffer == 0 {
            return Err(Error::Config {
                message: "event buffer must hold at least one event".to_string(),
                key: Some("event_buffer".to_string()),
            });
        }
        if !self.download.retrieval_url_prefix.starts_with('/')
            && !self.download.retrieval_url_prefix.contains("://")
        {
            return Err(Error::Config {
                message: format!(
                    "retrieval URL prefix '{}' must be an absolute path or URL",
                    self.download.retrieval_url_prefix
                ),
                key: Some("retrieval_url_prefix".to_string()),
            });
        }
        if self.persistence.checkpoint_backend == CheckpointBackend::Sqlite
            && self.persistence.database_path.as_os_str().is_empty()
        {
            return Err(Error::Config {
                message: "sqlite checkpoint backend needs a database path".to_string(),
                key: Some("database_path".to_string()),
            });
        }
        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_retrieval_url_prefix() -> String {
    "/api/v1/jobs".to_string()
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_database_path() -> PathBuf {
    PathBuf::from("channel-dl.db")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".into(),
        "http://127.0.0.1:3000".into(),
        "http://localhost:3001".into(),
        "http://127.0.0.1:3001".into(),
    ]
}

fn default_true() -> bool {
    true
}

fn default_event_buffer() -> usize {
    1000
}

/// Durations are (de)serialized as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
