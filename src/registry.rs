//! In-memory job registry
//!
//! Maps job ids to their mutable [`JobState`]. Each entry has exactly one
//! writer, the [`JobWriter`] handed out at creation and owned by the job's
//! background task; any number of readers take snapshots concurrently.
//! Entries are never evicted.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::types::{JobId, JobState};

type Entry = Arc<RwLock<JobState>>;

/// Concurrency-safe map from job id to job state
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<JobId, Entry>>>,
}

/// Exclusive mutation access to one registry entry
pub struct JobWriter {
    job_id: JobId,
    entry: Entry,
}

impl JobRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new job, returning the writer for its entry
    pub async fn create(&self, state: JobState) -> JobWriter {
        let job_id = state.job_id.clone();
        let entry = Arc::new(RwLock::new(state));
        self.jobs.write().await.insert(job_id.clone(), entry.clone());
        JobWriter { job_id, entry }
    }

    /// Insert a new job unless the same session already has an active job
    /// for the same channel
    ///
    /// On conflict the id of the active job is returned. The check and the
    /// insert happen under one lock, so two concurrent starts cannot both win.
    pub async fn create_exclusive(&self, state: JobState) -> Result<JobWriter, JobId> {
        let mut jobs = self.jobs.write().await;
        for (id, entry) in jobs.iter() {
            let existing = entry.read().await;
            if existing.session_id == state.session_id
                && existing.channel_id == state.channel_id
                && existing.status.is_active()
            {
                return Err(id.clone());
            }
        }

        let job_id = state.job_id.clone();
        let entry = Arc::new(RwLock::new(state));
        jobs.insert(job_id.clone(), entry.clone());
        Ok(JobWriter { job_id, entry })
    }

    /// Snapshot of a job's state
    pub async fn get(&self, job_id: &JobId) -> Option<JobState> {
        let entry = self.jobs.read().await.get(job_id).cloned()?;
        let state = entry.read().await;
        Some(state.clone())
    }

    /// Number of registered jobs
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether no job was ever registered
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl JobWriter {
    /// Id of the job this writer owns
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Mutate the job's state; the change is visible to the next reader
    pub async fn update<R>(&self, f: impl FnOnce(&mut JobState) -> R) -> R {
        let mut state = self.entry.write().await;
        f(&mut state)
    }

    /// Snapshot of the job's current state
    pub async fn snapshot(&self) -> JobState {
        self.entry.read().await.clone()
    }
}
