use super::*;

#[tokio::test]
async fn single_message_is_saved_under_the_session_directory() {
    let (downloader, dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let path = downloader
        .download_single(&session, "@media_archive", 20)
        .await
        .unwrap();

    let expected = dir
        .path()
        .join("downloads")
        .join("session-1")
        .join(CHANNEL_ID.abs().to_string())
        .join("b.mp4");
    assert_eq!(path, expected);
    assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 200);
}

#[tokio::test]
async fn single_download_leaves_the_checkpoint_alone() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    downloader
        .download_single(&session, "@media_archive", 30)
        .await
        .unwrap();

    let stored = downloader
        .checkpoints
        .load(&crate::checkpoint::CheckpointKey::new("session-1", CHANNEL_ID))
        .await
        .unwrap();
    assert_eq!(stored, None);
}

#[tokio::test]
async fn missing_and_text_messages_are_distinguished() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let err = downloader
        .download_message(&session, CHANNEL_ID, 999)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Download(DownloadError::MessageNotFound { message_id: 999 })
    ));

    let err = downloader
        .download_message(&session, CHANNEL_ID, 15)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Download(DownloadError::NoMedia { message_id: 15 })
    ));
}

#[tokio::test]
async fn transfer_failure_is_reported() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = remote_with(three_documents());
    remote.fail_download(10);
    let session = session(remote);

    let err = downloader
        .download_message(&session, CHANNEL_ID, 10)
        .await
        .unwrap_err();
    match err {
        Error::Download(DownloadError::Transfer { message_id, reason }) => {
            assert_eq!(message_id, 10);
            assert!(reason.contains("interrupted"));
        }
        other => panic!("expected Transfer, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_reports_one_outcome_per_id_in_request_order() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let summary = downloader
        .download_many(&session, "@media_archive", &[30, 15, 10, 404])
        .await
        .unwrap();

    assert_eq!(summary.total_requested, 4);
    assert_eq!(summary.total_downloaded, 2);
    let ids: Vec<i64> = summary.files.iter().map(|o| o.message_id).collect();
    assert_eq!(ids, vec![30, 15, 10, 404]);

    assert!(summary.files[0].success);
    assert_eq!(summary.files[0].filename.as_deref(), Some("file_30.zip"));
    assert_eq!(summary.files[0].size_bytes, 300);

    assert!(!summary.files[1].success);
    assert!(summary.files[1].error.as_deref().unwrap().contains("no downloadable media"));
    assert!(summary.files[2].success);
    assert!(!summary.files[3].success);
    assert!(summary.files[3].error.as_deref().unwrap().contains("not found"));
}

#[tokio::test]
async fn batch_on_an_unknown_channel_fails_before_any_transfer() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = remote_with(three_documents());
    let session = session(remote.clone());

    let err = downloader
        .download_many(&session, "@ghost_channel", &[10, 20])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Resolution(_)));
    assert!(remote.downloads().is_empty());
}
