//! In-process job store.
//!
//! Used by tests and local single-process deployments. Everything lives
//! behind one mutex, which also makes the claim trivially atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use banter_models::{Job, JobId, JobStatus, JobSubmission};

use crate::error::{StoreError, StoreResult};
use crate::store::JobStore;

/// In-memory `JobStore` implementation.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job as-is, bypassing the submission path. Lets tests and
    /// local tooling seed jobs with specific timestamps or statuses.
    pub async fn insert(&self, job: Job) {
        self.jobs
            .lock()
            .await
            .insert(job.id.as_str().to_string(), job);
    }

    /// Apply a guarded status transition under the store lock.
    async fn transition<F>(&self, id: &JobId, next: JobStatus, apply: F) -> StoreResult<()>
    where
        F: FnOnce(Job) -> Job,
    {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::not_found(id.as_str()))?;

        if !job.status.can_transition_to(next) {
            warn!(
                job_id = %id,
                from = %job.status,
                to = %next,
                "Dropping disallowed status transition"
            );
            return Ok(());
        }

        jobs.insert(id.as_str().to_string(), apply(job));
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn enqueue(&self, submission: JobSubmission) -> StoreResult<Job> {
        let job = Job::new(submission);
        self.jobs
            .lock()
            .await
            .insert(job.id.as_str().to_string(), job.clone());
        Ok(job)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.lock().await.get(id.as_str()).cloned())
    }

    async fn claim_oldest_pending(&self) -> StoreResult<Option<Job>> {
        let mut jobs = self.jobs.lock().await;

        let oldest = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .min_by_key(|j| (j.created_at, j.id.as_str().to_string()))
            .map(|j| j.id.clone());

        let Some(id) = oldest else {
            return Ok(None);
        };

        let claimed = jobs
            .remove(id.as_str())
            .expect("job present under lock")
            .start();
        jobs.insert(id.as_str().to_string(), claimed.clone());
        Ok(Some(claimed))
    }

    async fn mark_processing(&self, id: &JobId) -> StoreResult<()> {
        self.transition(id, JobStatus::Processing, Job::start).await
    }

    async fn mark_completed(&self, id: &JobId, output_path: &str) -> StoreResult<()> {
        let output_path = output_path.to_string();
        self.transition(id, JobStatus::Completed, move |j| j.complete(output_path))
            .await
    }

    async fn mark_failed(&self, id: &JobId, message: &str) -> StoreResult<()> {
        let message = message.to_string();
        self.transition(id, JobStatus::Failed, move |j| j.fail(message))
            .await
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.lock().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_models::{CommentaryStyle, ConversationSpeed, JobConfig};

    fn submission(url: &str) -> JobSubmission {
        JobSubmission {
            source_url: url.to_string(),
            source_id: "dQw4w9WgXcQ".to_string(),
            config: JobConfig {
                num_agents: 2,
                personalities: vec!["Sassy".to_string(), "Deadpan".to_string()],
                commentary_style: CommentaryStyle::Roast,
                clip_interval: 1.0,
                conversation_speed: ConversationSpeed::Medium,
                target_length: 15.0,
            },
        }
    }

    #[tokio::test]
    async fn test_claim_picks_oldest_pending() {
        let store = MemoryJobStore::new();
        let first = store.enqueue(submission("https://youtu.be/a")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let _second = store.enqueue(submission("https://youtu.be/b")).await.unwrap();

        let claimed = store.claim_oldest_pending().await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_claim_returns_none_when_no_pending_jobs() {
        let store = MemoryJobStore::new();
        assert!(store.claim_oldest_pending().await.unwrap().is_none());

        let job = store.enqueue(submission("https://youtu.be/a")).await.unwrap();
        store.claim_oldest_pending().await.unwrap().unwrap();
        // Already claimed, nothing left to claim
        assert!(store.claim_oldest_pending().await.unwrap().is_none());

        let stored = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn test_terminal_states_are_sticky() {
        let store = MemoryJobStore::new();
        let job = store.enqueue(submission("https://youtu.be/a")).await.unwrap();
        store.claim_oldest_pending().await.unwrap();
        store.mark_completed(&job.id, "out/key.mp4").await.unwrap();

        // A late failure write must not overwrite the completed state
        store.mark_failed(&job.id, "too late").await.unwrap();

        let stored = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Completed);
        assert_eq!(stored.output_path.as_deref(), Some("out/key.mp4"));
        assert!(stored.error_message.is_none());
    }

    #[tokio::test]
    async fn test_mark_failed_records_message() {
        let store = MemoryJobStore::new();
        let job = store.enqueue(submission("https://youtu.be/a")).await.unwrap();
        store.claim_oldest_pending().await.unwrap();
        store.mark_failed(&job.id, "downloader unavailable").await.unwrap();

        let stored = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.error_message.as_deref(), Some("downloader unavailable"));
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = MemoryJobStore::new();
        for _ in 0..3 {
            store.enqueue(submission("https://youtu.be/a")).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].created_at >= recent[1].created_at);
    }
}
