use std::sync::Arc;
use std::time::Duration;

use crate::checkpoint::{CheckpointKey, CheckpointStore};
use crate::remote::{Entity, MemoryRemote};
use crate::session::SessionHandle;
use crate::types::JobId;

use super::*;

#[tokio::test]
async fn start_download_runs_job_to_completion() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    assert_eq!(job_id.as_str().len(), 32);

    let state = wait_for_terminal(&downloader, &job_id).await;
    assert_eq!(state.status, JobStatus::Completed);
    assert_eq!(state.channel_id, CHANNEL_ID);
    assert_eq!(state.downloaded_files, 3);
    assert!(state.download_dir.ends_with(format!("session-1/{}", CHANNEL_ID.abs())));
    for file in &state.files {
        assert!(file.storage_path.exists(), "{} missing", file.filename);
    }
}

#[tokio::test]
async fn numeric_reference_resolves_to_the_same_channel() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let job_id = downloader
        .start_download(&session, &CHANNEL_ID.to_string())
        .await
        .unwrap();
    let state = wait_for_terminal(&downloader, &job_id).await;
    assert_eq!(state.channel_id, CHANNEL_ID);
}

#[tokio::test]
async fn unresolvable_reference_is_rejected_before_a_job_exists() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));

    let err = downloader
        .start_download(&session, "@nobody_here")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::InvalidChannel { .. })
    ));
    assert!(downloader.jobs().is_empty().await);
}

#[tokio::test]
async fn second_job_for_a_running_channel_is_refused() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_channel(channel_entity(), three_documents())
            .with_transfer_delay(Duration::from_millis(200)),
    );
    let session = session(remote);

    let first = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    let err = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap_err();
    match err {
        Error::Download(DownloadError::JobAlreadyActive { job_id, channel_id }) => {
            assert_eq!(job_id, first.to_string());
            assert_eq!(channel_id, CHANNEL_ID);
        }
        other => panic!("expected JobAlreadyActive, got {other:?}"),
    }

    wait_for_terminal(&downloader, &first).await;
    let again = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    assert_ne!(again, first);
}

#[tokio::test]
async fn other_sessions_may_run_the_same_channel() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_channel(channel_entity(), three_documents())
            .with_transfer_delay(Duration::from_millis(100)),
    );
    let alice = SessionHandle::new("alice", remote.clone());
    let bob = SessionHandle::new("bob", remote);

    let a = downloader.start_download(&alice, "@media_archive").await.unwrap();
    let b = downloader.start_download(&bob, "@media_archive").await.unwrap();

    let a = wait_for_terminal(&downloader, &a).await;
    let b = wait_for_terminal(&downloader, &b).await;
    assert_eq!(a.downloaded_files, 3);
    assert_eq!(b.downloaded_files, 3);
    assert_ne!(a.download_dir, b.download_dir);
}

#[tokio::test]
async fn rerun_only_fetches_new_media() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = remote_with(three_documents());
    let session = session(remote.clone());

    let first = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    wait_for_terminal(&downloader, &first).await;

    remote.push_message(CHANNEL_ID, Message::photo(40, 64));
    let second = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    let state = wait_for_terminal(&downloader, &second).await;

    assert_eq!(state.total_files, 1);
    assert_eq!(state.files[0].filename, "photo_40.jpg");
    assert_eq!(state.last_checkpointed_message_id, Some(40));
    assert_eq!(remote.downloads(), vec![10, 20, 30, 40]);
}

#[tokio::test]
async fn sqlite_backend_persists_checkpoints() {
    let (downloader, _dir) = create_sqlite_downloader().await;
    let session = session(remote_with(three_documents()));

    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    wait_for_terminal(&downloader, &job_id).await;

    let stored = downloader
        .checkpoints
        .load(&CheckpointKey::new("session-1", CHANNEL_ID))
        .await
        .unwrap();
    assert_eq!(stored, Some(30));

    let db = downloader.db.as_ref().unwrap();
    let rows = db.list_checkpoints("session-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].channel_id, CHANNEL_ID);
}

// -----------------------------------------------------------------------
// Status and file lookup
// -----------------------------------------------------------------------

#[tokio::test]
async fn unknown_job_is_not_found() {
    let (downloader, _dir) = create_test_downloader().await;
    let err = downloader
        .job_status(&JobId::from("0123456789abcdef0123456789abcdef"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn jobs_are_private_to_their_session() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));
    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    wait_for_terminal(&downloader, &job_id).await;

    assert!(downloader.job_for_session("session-1", &job_id).await.is_ok());
    let err = downloader
        .job_for_session("intruder", &job_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(_)));
}

#[tokio::test]
async fn job_file_path_serves_recorded_files_only() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));
    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    wait_for_terminal(&downloader, &job_id).await;

    let path = downloader
        .job_file_path("session-1", &job_id, "b.mp4")
        .await
        .unwrap();
    assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 200);

    for name in ["../b.mp4", "missing.bin", "last_message_id.txt", ""] {
        let err = downloader
            .job_file_path("session-1", &job_id, name)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{name:?} was served");
    }
}

#[tokio::test]
async fn deleted_file_is_not_found() {
    let (downloader, _dir) = create_test_downloader().await;
    let session = session(remote_with(three_documents()));
    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();
    let state = wait_for_terminal(&downloader, &job_id).await;

    tokio::fs::remove_file(&state.files[0].storage_path)
        .await
        .unwrap();
    let err = downloader
        .job_file_path("session-1", &job_id, "a.pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn progress_counters_never_exceed_total() {
    let (downloader, _dir) = create_test_downloader().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_channel(
                Entity {
                    id: CHANNEL_ID,
                    title: None,
                    username: Some("media_archive".into()),
                },
                three_documents(),
            )
            .with_transfer_delay(Duration::from_millis(20)),
    );
    let session = session(remote);
    let job_id = downloader
        .start_download(&session, "@media_archive")
        .await
        .unwrap();

    loop {
        let state = downloader.job_status(&job_id).await.unwrap();
        assert!(state.downloaded_files <= state.total_files);
        assert!((0.0..=100.0).contains(&state.progress));
        if state.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
