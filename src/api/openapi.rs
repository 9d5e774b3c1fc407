//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the channel-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the channel-dl REST API
///
/// The spec can be accessed via:
/// - `/api/v1/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "channel-dl REST API",
        version = "0.1.0",
        description = "REST API for downloading the media of messaging channels with resumable, checkpointed jobs",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::start_job,
        crate::api::routes::get_job,
        crate::api::routes::get_job_file,

        // Channels
        crate::api::routes::list_channel_files,
        crate::api::routes::download_channel_file,
        crate::api::routes::download_channel_files,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::JobState,
        crate::types::FileRecord,
        crate::types::FailedFile,
        crate::types::FileDescriptor,
        crate::types::ChannelListing,
        crate::types::ItemOutcome,
        crate::types::BatchDownloadSummary,

        // API request/response types from routes
        crate::api::routes::ChannelRequest,
        crate::api::routes::BatchDownloadRequest,
        crate::api::routes::StartJobResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Jobs - Start resumable channel downloads, poll progress, fetch saved files"),
        (name = "channels", description = "Channels - List media and download individual messages"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon declaring the bearer session token scheme
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}
