//! Channel handlers: listing and selective downloads.

use super::{BatchDownloadRequest, ChannelRequest, file_response};
use crate::api::AppState;
use crate::error::Result;
use crate::session::SessionHandle;
use crate::types::{BatchDownloadSummary, ChannelListing};
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};

/// POST /channels/files - List a channel's media files
#[utoipa::path(
    post,
    path = "/api/v1/channels/files",
    tag = "channels",
    request_body = ChannelRequest,
    responses(
        (status = 200, description = "Media files in ascending message order", body = ChannelListing),
        (status = 400, description = "Channel reference could not be resolved", body = crate::error::ApiError),
        (status = 502, description = "Listing the channel failed", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn list_channel_files(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<ChannelRequest>,
) -> Result<Json<ChannelListing>> {
    let listing = state
        .downloader
        .list_channel_files(&session, &request.channel)
        .await?;
    Ok(Json(listing))
}

/// POST /channels/files/:message_id/download - Download one message's media
#[utoipa::path(
    post,
    path = "/api/v1/channels/files/{message_id}/download",
    tag = "channels",
    request_body = ChannelRequest,
    params(
        ("message_id" = i64, Path, description = "Message ID")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Unresolvable channel", body = crate::error::ApiError),
        (status = 404, description = "Message not found or without media", body = crate::error::ApiError),
        (status = 502, description = "Transfer failed", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn download_channel_file(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(message_id): Path<i64>,
    Json(request): Json<ChannelRequest>,
) -> Result<Response> {
    let path = state
        .downloader
        .download_single(&session, &request.channel, message_id)
        .await?;
    file_response(&path).await
}

/// POST /channels/files/download - Download several messages
#[utoipa::path(
    post,
    path = "/api/v1/channels/files/download",
    tag = "channels",
    request_body = BatchDownloadRequest,
    responses(
        (status = 200, description = "One outcome per requested message", body = BatchDownloadSummary),
        (status = 400, description = "Channel reference could not be resolved", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn download_channel_files(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<BatchDownloadRequest>,
) -> Result<Json<BatchDownloadSummary>> {
    let summary = state
        .downloader
        .download_many(&session, &request.channel, &request.message_ids)
        .await?;
    Ok(Json(summary))
}
