use super::*;
use crate::remote::Message;
use serde_json::json;

#[tokio::test]
async fn test_list_channel_files() {
    let mut messages = three_documents();
    messages.push(Message::photo(40, 12));
    let app = TestApp::new(remote_with(messages)).await;

    let response = app
        .send(app.post_json("/api/v1/channels/files", json!({"channel": "@media_archive"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["channel_id"], CHANNEL_ID);
    assert_eq!(body["channel_name"], "Media Archive");
    assert_eq!(body["total_count"], 4);
    let files = body["files"].as_array().unwrap();
    assert_eq!(files[0]["filename"], "a.pdf");
    assert_eq!(files[1]["is_video"], true);
    assert_eq!(files[3]["filename"], "photo_40.jpg");
    assert_eq!(files[3]["is_photo"], true);
}

#[tokio::test]
async fn test_list_private_channel() {
    let remote = Arc::new(
        MemoryRemote::new().with_private(crate::remote::PeerRef::Username("secret".into())),
    );
    let app = TestApp::new(remote).await;

    let response = app
        .send(app.post_json("/api/v1/channels/files", json!({"channel": "@secret"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "channel_private");
}

#[tokio::test]
async fn test_listing_failure_is_bad_gateway() {
    let remote = remote_with(three_documents());
    remote.fail_enumeration(CHANNEL_ID);
    let app = TestApp::new(remote).await;

    let response = app
        .send(app.post_json("/api/v1/channels/files", json!({"channel": "@media_archive"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["code"], "enumeration_failed");
}

#[tokio::test]
async fn test_download_single_file() {
    let app = TestApp::new(remote_with(three_documents())).await;

    let response = app
        .send(app.post_json(
            "/api/v1/channels/files/20/download",
            json!({"channel": "https://t.me/media_archive"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("b.mp4")
    );
    assert_eq!(body_bytes(response).await.len(), 200);
}

#[tokio::test]
async fn test_download_single_missing_and_text_messages() {
    let app = TestApp::new(remote_with(three_documents())).await;

    let response = app
        .send(app.post_json(
            "/api/v1/channels/files/999/download",
            json!({"channel": "@media_archive"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "message_not_found");

    let response = app
        .send(app.post_json(
            "/api/v1/channels/files/15/download",
            json!({"channel": "@media_archive"}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "no_media");
    assert_eq!(body["error"]["details"]["message_id"], 15);
}

#[tokio::test]
async fn test_batch_download() {
    let remote = remote_with(three_documents());
    remote.fail_download(20);
    let app = TestApp::new(remote).await;

    let response = app
        .send(app.post_json(
            "/api/v1/channels/files/download",
            json!({"channel": "@media_archive", "message_ids": [10, 20, 30]}),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total_requested"], 3);
    assert_eq!(body["total_downloaded"], 2);
    let files = body["files"].as_array().unwrap();
    assert_eq!(files[1]["message_id"], 20);
    assert_eq!(files[1]["success"], false);
    assert!(files[1]["error"].as_str().unwrap().contains("interrupted"));
    assert!(files[0].get("error").is_none());
}
