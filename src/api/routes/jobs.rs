//! Job handlers: start, status, file retrieval.

use super::{ChannelRequest, StartJobResponse, file_response};
use crate::api::AppState;
use crate::error::Result;
use crate::session::SessionHandle;
use crate::types::{JobId, JobState};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /jobs - Start downloading a channel's new media
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    tag = "jobs",
    request_body = ChannelRequest,
    responses(
        (status = 202, description = "Job started", body = StartJobResponse),
        (status = 400, description = "Channel reference could not be resolved", body = crate::error::ApiError),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ApiError),
        (status = 409, description = "A job for this channel is already running", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn start_job(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Json(request): Json<ChannelRequest>,
) -> Result<Response> {
    let job_id = state
        .downloader
        .start_download(&session, &request.channel)
        .await?;

    let response = StartJobResponse {
        message: format!("Download started for {}", request.channel.trim()),
        job_id,
        status: "started".to_string(),
    };
    Ok((StatusCode::ACCEPTED, Json(response)).into_response())
}

/// GET /jobs/:id - Job status snapshot
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job state", body = JobState),
        (status = 403, description = "Job belongs to another session", body = crate::error::ApiError),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn get_job(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(id): Path<String>,
) -> Result<Json<JobState>> {
    let job = state
        .downloader
        .job_for_session(&session.session_id, &JobId::from(id))
        .await?;
    Ok(Json(job))
}

/// GET /jobs/:id/files/:filename - Download a file saved by a job
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/files/{filename}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job ID"),
        ("filename" = String, Path, description = "File name as listed in the job's files")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 403, description = "Job belongs to another session", body = crate::error::ApiError),
        (status = 404, description = "Job or file not found", body = crate::error::ApiError)
    ),
    security(("bearer" = []))
)]
pub async fn get_job_file(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Response> {
    let path = state
        .downloader
        .job_file_path(&session.session_id, &JobId::from(id), &filename)
        .await?;
    file_response(&path).await
}
