//! Error types for channel-dl
//!
//! This module provides the error handling for the library:
//! - Domain-specific error types (resolution, download, database)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::remote::RemoteError;

/// Result type alias for channel-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for channel-dl
///
/// Each variant carries enough context to produce a user-facing message.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Channel reference could not be turned into a channel id
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Listing the channel's messages failed
    #[error("failed to list messages of channel {channel_id}: {message}")]
    Enumeration {
        /// Channel being enumerated
        channel_id: i64,
        /// Description of the underlying failure
        message: String,
    },

    /// Download-related error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Remote service failure outside resolution and enumeration
    #[error("remote service error: {0}")]
    Remote(#[from] RemoteError),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Missing, invalid or expired credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the resource belongs to another session
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new jobs")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures turning a channel reference into a channel id
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The reference does not name a valid channel
    #[error("invalid channel: {reference}")]
    InvalidChannel {
        /// The reference as the caller supplied it
        reference: String,
    },

    /// The channel is private or the session has no access
    #[error("channel {reference} is private or access denied")]
    PrivateOrDenied {
        /// The reference as the caller supplied it
        reference: String,
    },

    /// The invite link has expired
    #[error("invite link has expired")]
    ExpiredInvite,

    /// Any other failure, with a message suitable for the user
    #[error("{message}")]
    Unresolvable {
        /// User-facing explanation
        message: String,
    },
}

/// Download-related errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The requested message does not exist
    #[error("message {message_id} not found")]
    MessageNotFound {
        /// The message id that was requested
        message_id: i64,
    },

    /// The message exists but carries no document or photo
    #[error("message {message_id} has no downloadable media")]
    NoMedia {
        /// The message id that was requested
        message_id: i64,
    },

    /// Fetching or storing the media failed
    #[error("failed to download message {message_id}: {reason}")]
    Transfer {
        /// The message whose media failed
        message_id: i64,
        /// The underlying failure
        reason: String,
    },

    /// A job for the same session and channel is still running
    #[error("job {job_id} is already downloading channel {channel_id}")]
    JobAlreadyActive {
        /// The active job
        job_id: String,
        /// The channel it is downloading
        channel_id: i64,
    },
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job 1f3a... not found"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_channel")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the channel reference was unusable
            Error::Config { .. } => 400,
            Error::Resolution(_) => 400,

            Error::Unauthorized(_) => 401,
            Error::Forbidden(_) => 403,

            // 404 Not Found
            Error::NotFound(_) => 404,
            Error::Download(DownloadError::NoMedia { .. }) => 404,
            Error::Download(DownloadError::MessageNotFound { .. }) => 404,

            // 409 Conflict
            Error::Download(DownloadError::JobAlreadyActive { .. }) => 409,

            // 502 Bad Gateway - remote service failures
            Error::Enumeration { .. } => 502,
            Error::Remote(RemoteError::NotAuthorized) => 401,
            Error::Remote(_) => 502,
            Error::Download(DownloadError::Transfer { .. }) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 500 Internal Server Error
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Resolution(e) => match e {
                ResolutionError::InvalidChannel { .. } => "invalid_channel",
                ResolutionError::PrivateOrDenied { .. } => "channel_private",
                ResolutionError::ExpiredInvite => "invite_expired",
                ResolutionError::Unresolvable { .. } => "unresolvable_channel",
            },
            Error::Enumeration { .. } => "enumeration_failed",
            Error::Download(e) => match e {
                DownloadError::MessageNotFound { .. } => "message_not_found",
                DownloadError::NoMedia { .. } => "no_media",
                DownloadError::Transfer { .. } => "transfer_failed",
                DownloadError::JobAlreadyActive { .. } => "job_already_active",
            },
            Error::Remote(_) => "remote_error",
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotFound(_) => "not_found",
            Error::Unauthorized(_) => "unauthorized",
            Error::Forbidden(_) => "forbidden",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Download(DownloadError::MessageNotFound { message_id })
            | Error::Download(DownloadError::NoMedia { message_id })
            | Error::Download(DownloadError::Transfer { message_id, .. }) => {
                Some(serde_json::json!({
                    "message_id": message_id,
                }))
            }
            Error::Download(DownloadError::JobAlreadyActive { job_id, channel_id }) => {
                Some(serde_json::json!({
                    "job_id": job_id,
                    "channel_id": channel_id,
                }))
            }
            Error::Enumeration { channel_id, .. } => Some(serde_json::json!({
                "channel_id": channel_id,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
