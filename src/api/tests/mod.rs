use super::*;
use crate::downloader::test_helpers::{self, CHANNEL_ID, remote_with, three_documents};
use crate::remote::MemoryRemote;
use crate::session::SessionHandle;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;

mod channels;

/// Router plus the pieces tests poke at directly
struct TestApp {
    router: Router,
    downloader: Arc<ChannelDownloader>,
    token: String,
    sessions: SessionRegistry,
    _temp_dir: tempfile::TempDir,
}

impl TestApp {
    async fn new(remote: Arc<MemoryRemote>) -> Self {
        let (downloader, temp_dir) = test_helpers::create_test_downloader().await;
        let downloader = Arc::new(downloader);
        let sessions = SessionRegistry::new();
        let token = sessions
            .register(SessionHandle::new("session-1", remote))
            .await;
        let router = create_router(downloader.clone(), sessions.clone(), downloader.get_config());
        Self {
            router,
            downloader,
            token,
            sessions,
            _temp_dir: temp_dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn get(&self, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("Authorization", format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(&self, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (downloader, _temp_dir) = test_helpers::create_test_downloader().await;

    let mut config = (*downloader.config).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn(start_api_server(
        Arc::new(downloader),
        SessionRegistry::new(),
        config,
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server exited early");
    api_handle.abort();
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = TestApp::new(remote_with(three_documents())).await;

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (downloader, _temp_dir) = test_helpers::create_test_downloader().await;
    let mut config = (*downloader.config).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(Arc::new(downloader), SessionRegistry::new(), Arc::new(config));

    let request = Request::builder()
        .uri("/api/v1/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = TestApp::new(remote_with(three_documents())).await;

    for uri in ["/api/v1/jobs/abc", "/api/v1/events"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.send(request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/jobs")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"channel":"@media_archive"}"#))
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_is_rejected() {
    let app = TestApp::new(remote_with(three_documents())).await;
    assert!(app.sessions.revoke(&app.token).await);

    let response = app.send(app.get("/api/v1/jobs/abc")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
