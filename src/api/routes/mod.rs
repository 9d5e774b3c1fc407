//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Checkpointed channel jobs and their files
//! - [`channels`] - Channel listing and selective downloads
//! - [`system`] - Health, events, OpenAPI

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio_util::io::ReaderStream;

use crate::error::Result;
use crate::types::JobId;

mod channels;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use channels::*;
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body naming a channel
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ChannelRequest {
    /// `@username`, `t.me` link, invite link or numeric id
    pub channel: String,
}

/// Request body for POST /channels/files/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct BatchDownloadRequest {
    /// `@username`, `t.me` link, invite link or numeric id
    pub channel: String,
    /// Messages to download, in the order outcomes are reported
    pub message_ids: Vec<i64>,
}

/// Response for POST /jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartJobResponse {
    /// Id to poll with GET /jobs/{id}
    pub job_id: JobId,
    /// Always `started`
    pub status: String,
    /// Human-readable summary
    pub message: String,
}

/// Stream a file on disk as an attachment
pub(crate) async fn file_response(path: &Path) -> Result<Response> {
    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();
    let filename = crate::utils::file_name_of(path);

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        filename.replace(['"', '\\'], "_"),
        urlencoding::encode(&filename)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(length)),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
