//! Waiting on jobs

use std::time::Duration;

use channel_dl::{ChannelDownloader, EventKind, JobId, JobState};

/// Poll a job until it reaches a terminal status
pub async fn wait_for_job(downloader: &ChannelDownloader, job_id: &JobId) -> JobState {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let state = downloader
                .job_status(job_id)
                .await
                .expect("job should exist");
            if state.status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}

/// Collect the event kinds of one job until it completes or fails
pub async fn collect_job_events(
    events: &mut tokio::sync::broadcast::Receiver<channel_dl::Event>,
    job_id: &JobId,
) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if &event.job_id != job_id {
                continue;
            }
            let done = matches!(
                event.kind,
                EventKind::JobCompleted { .. } | EventKind::JobFailed { .. }
            );
            kinds.push(event.kind);
            if done {
                return;
            }
        }
    })
    .await
    .expect("job events did not finish in time");
    kinds
}
