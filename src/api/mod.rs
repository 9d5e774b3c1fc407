//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for starting channel download
//! jobs, polling them, and listing or fetching individual channel media.

use crate::session::SessionRegistry;
use crate::{ChannelDownloader, Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// Every route lives under `/api/v1`.
///
/// # Routes
///
/// ## Jobs
/// - `POST /jobs` - Start a checkpointed download of a channel
/// - `GET /jobs/:id` - Job status
/// - `GET /jobs/:id/files/:filename` - Fetch a file saved by a job
///
/// ## Channels
/// - `POST /channels/files` - List a channel's media
/// - `POST /channels/files/:message_id/download` - Download one message's media
/// - `POST /channels/files/download` - Download several messages
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /events` - Server-sent events for the caller's jobs
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
///
/// All routes except `/health` and `/openapi.json` require a bearer token
/// registered in `sessions`.
pub fn create_router(
    downloader: Arc<ChannelDownloader>,
    sessions: SessionRegistry,
    config: Arc<Config>,
) -> Router {
    let state = AppState::new(downloader, sessions.clone(), config.clone());

    let protected = Router::new()
        // Jobs
        .route("/jobs", post(routes::start_job))
        .route("/jobs/:id", get(routes::get_job))
        .route("/jobs/:id/files/:filename", get(routes::get_job_file))
        // Channels
        .route("/channels/files", post(routes::list_channel_files))
        .route("/channels/files/download", post(routes::download_channel_files))
        .route(
            "/channels/files/:message_id/download",
            post(routes::download_channel_file),
        )
        // Events
        .route("/events", get(routes::event_stream))
        .route_layer(middleware::from_fn_with_state(
            sessions,
            auth::require_session,
        ));

    let public = Router::new()
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new().nest("/api/v1", protected.merge(public));

    // Swagger UI uses the /api/v1/openapi.json endpoint defined above
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/v1/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server stops or fails.
///
/// # Example
///
/// ```no_run
/// use channel_dl::{ChannelDownloader, Config};
/// use channel_dl::session::SessionRegistry;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let downloader = Arc::new(ChannelDownloader::new((*config).clone()).await?);
/// let sessions = SessionRegistry::new();
///
/// // Start API server (blocks until shutdown)
/// channel_dl::api::start_api_server(downloader, sessions, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    downloader: Arc<ChannelDownloader>,
    sessions: SessionRegistry,
    config: Arc<Config>,
) -> Result<()> {
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(downloader, sessions, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
