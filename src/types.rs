//! Core types for channel-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Unique identifier for a download job
///
/// Opaque to callers: 128 random bits rendered as lowercase hex.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Allocate a fresh random id
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Job status
///
/// `Pending -> InProgress -> (Completed | Failed)`. The last two are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, background task not yet running
    Pending,
    /// Background task is enumerating or downloading
    InProgress,
    /// Every enumerated file was processed (individual failures tolerated)
    Completed,
    /// Connection, checkpoint read or enumeration failed
    Failed,
}

impl JobStatus {
    /// Whether the job can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether the job is still owned by a running task
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Lowercase name, as used in logs and API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// A file saved by a job
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileRecord {
    /// Message the file came from
    pub message_id: i64,
    /// File name on disk
    pub filename: String,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// Absolute or download-dir-relative storage path
    #[schema(value_type = String)]
    pub storage_path: PathBuf,
    /// URL the HTTP layer serves the file under
    pub retrieval_url: String,
}

/// A file a job could not save
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedFile {
    /// Message whose media failed
    pub message_id: i64,
    /// Failure description
    pub error: String,
}

/// Mutable state of one download job
///
/// Owned by the job's background task while it runs; everyone else reads
/// snapshots through the [`JobRegistry`](crate::registry::JobRegistry).
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct JobState {
    /// Job id
    pub job_id: JobId,
    /// Canonical channel id being downloaded
    pub channel_id: i64,
    /// Session that started the job
    #[serde(skip_serializing)]
    pub session_id: String,
    /// Current status
    pub status: JobStatus,
    /// Progress percentage (0.0 to 100.0)
    pub progress: f64,
    /// Number of media messages found after the checkpoint
    pub total_files: u64,
    /// Number of files saved so far
    pub downloaded_files: u64,
    /// Label of the file being transferred, while one is in flight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_file: Option<String>,
    /// Error message, present only when the job failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Directory files are saved to
    #[serde(skip_serializing)]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,
    /// Saved files, in download order
    pub files: Vec<FileRecord>,
    /// Files skipped because their transfer failed
    pub failed_files: Vec<FailedFile>,
    /// Last checkpointed message id, mirroring the checkpoint store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checkpointed_message_id: Option<i64>,
    /// When the job was created
    pub created_at: DateTime<Utc>,
}

impl JobState {
    /// Fresh pending state for a new job
    pub fn new(job_id: JobId, channel_id: i64, session_id: String, download_dir: PathBuf) -> Self {
        Self {
            job_id,
            channel_id,
            session_id,
            status: JobStatus::Pending,
            progress: 0.0,
            total_files: 0,
            downloaded_files: 0,
            current_file: None,
            error: None,
            download_dir,
            files: Vec::new(),
            failed_files: Vec::new(),
            last_checkpointed_message_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Description of one media message, produced without downloading it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FileDescriptor {
    /// Message id
    pub message_id: i64,
    /// Declared or synthesized file name
    pub filename: String,
    /// Declared size in bytes
    pub size_bytes: u64,
    /// MIME type, when known
    pub mime_type: Option<String>,
    /// Message send time
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the document is a video
    pub is_video: bool,
    /// Whether the media is a photo
    pub is_photo: bool,
}

/// All media files of a channel
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ChannelListing {
    /// Canonical channel id
    pub channel_id: i64,
    /// Channel title or username, when the lookup succeeds
    pub channel_name: Option<String>,
    /// Media files in ascending message order
    pub files: Vec<FileDescriptor>,
    /// Number of files
    pub total_count: usize,
}

/// Per-message result of a batch download
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemOutcome {
    /// Requested message id
    pub message_id: i64,
    /// Whether the file was saved
    pub success: bool,
    /// Saved file name
    pub filename: Option<String>,
    /// Saved size in bytes
    pub size_bytes: u64,
    /// Storage path of the saved file
    #[schema(value_type = Option<String>)]
    pub storage_path: Option<PathBuf>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    /// Outcome for a saved file
    pub fn saved(message_id: i64, filename: String, size_bytes: u64, path: PathBuf) -> Self {
        Self {
            message_id,
            success: true,
            filename: Some(filename),
            size_bytes,
            storage_path: Some(path),
            error: None,
        }
    }

    /// Outcome for a file that could not be saved
    pub fn failed(message_id: i64, error: impl Into<String>) -> Self {
        Self {
            message_id,
            success: false,
            filename: None,
            size_bytes: 0,
            storage_path: None,
            error: Some(error.into()),
        }
    }
}

/// Result of downloading a list of messages
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchDownloadSummary {
    /// Number of message ids requested
    pub total_requested: usize,
    /// Number of files saved
    pub total_downloaded: usize,
    /// One outcome per requested id, in request order
    pub files: Vec<ItemOutcome>,
}

impl BatchDownloadSummary {
    /// Summarize per-item outcomes
    pub fn from_outcomes(files: Vec<ItemOutcome>) -> Self {
        Self {
            total_requested: files.len(),
            total_downloaded: files.iter().filter(|f| f.success).count(),
            files,
        }
    }
}

/// Event emitted during a job's lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// Job the event belongs to
    pub job_id: JobId,
    /// Session that owns the job
    #[serde(skip)]
    pub session_id: String,
    /// What happened
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Kind of job event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Job registered, task not yet running
    JobQueued {
        /// Channel being downloaded
        channel_id: i64,
    },
    /// Background task started
    JobStarted,
    /// Enumeration finished
    FilesEnumerated {
        /// Files that will be attempted
        total_files: u64,
        /// Checkpoint the run resumed from
        resumed_after: Option<i64>,
    },
    /// One file saved
    FileDownloaded {
        /// Source message
        message_id: i64,
        /// File name on disk
        filename: String,
        /// Progress percentage after this file
        progress: f64,
    },
    /// One file skipped after a transfer failure
    FileFailed {
        /// Source message
        message_id: i64,
        /// Failure description
        error: String,
    },
    /// Job finished
    JobCompleted {
        /// Files saved
        downloaded_files: u64,
        /// Files attempted
        total_files: u64,
    },
    /// Job failed before downloading
    JobFailed {
        /// Failure description
        error: String,
    },
}

impl EventKind {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::JobQueued { .. } => "job_queued",
            EventKind::JobStarted => "job_started",
            EventKind::FilesEnumerated { .. } => "files_enumerated",
            EventKind::FileDownloaded { .. } => "file_downloaded",
            EventKind::FileFailed { .. } => "file_failed",
            EventKind::JobCompleted { .. } => "job_completed",
            EventKind::JobFailed { .. } => "job_failed",
        }
    }
}
