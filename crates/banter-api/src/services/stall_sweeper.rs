//! Stalled job detection.
//!
//! A worker that dies mid-pipeline leaves its job stuck in `processing`.
//! The sweeper runs opportunistically when clients read the job listing
//! and fails any processing job older than the stall threshold, so stuck
//! jobs surface as failures instead of spinning forever in the UI.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use banter_models::JobStatus;
use banter_store::{JobStore, StoreResult};

/// Error message recorded on jobs the sweeper fails.
pub const STALL_ERROR_MESSAGE: &str = "Video processing timed out";

/// Fails processing jobs that have exceeded the stall threshold.
pub struct StallSweeper {
    store: Arc<dyn JobStore>,
    threshold: Duration,
    scan_limit: usize,
}

impl StallSweeper {
    pub fn new(store: Arc<dyn JobStore>, threshold: Duration, scan_limit: usize) -> Self {
        Self {
            store,
            threshold,
            scan_limit,
        }
    }

    /// Run one sweep over recent jobs. Returns how many were failed.
    ///
    /// Age is measured from job creation, so a job that genuinely takes
    /// longer than the threshold is also swept. That is accepted: the
    /// threshold is sized well above any expected pipeline run.
    pub async fn sweep(&self) -> StoreResult<u32> {
        let threshold = chrono::Duration::from_std(self.threshold)
            .unwrap_or_else(|_| chrono::Duration::seconds(600));
        let now = Utc::now();
        let mut swept = 0u32;

        for job in self.store.list_recent(self.scan_limit).await? {
            if job.status != JobStatus::Processing || job.age(now) <= threshold {
                continue;
            }

            warn!(
                job_id = %job.id,
                age_secs = job.age(now).num_seconds(),
                "Failing stalled job"
            );
            self.store.mark_failed(&job.id, STALL_ERROR_MESSAGE).await?;
            swept += 1;
        }

        if swept > 0 {
            info!(swept, "Stall sweep failed {} job(s)", swept);
        }
        Ok(swept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_models::{
        CommentaryStyle, ConversationSpeed, Job, JobConfig, JobSubmission,
    };
    use banter_store::MemoryJobStore;

    fn submission() -> JobSubmission {
        JobSubmission {
            source_url: "https://www.youtube.com/watch?v=aaaaaaaaaaa".to_string(),
            source_id: "aaaaaaaaaaa".to_string(),
            config: JobConfig {
                num_agents: 2,
                personalities: vec!["dry".to_string(), "upbeat".to_string()],
                commentary_style: CommentaryStyle::Praise,
                clip_interval: 1.5,
                conversation_speed: ConversationSpeed::Medium,
                target_length: 15.0,
            },
        }
    }

    fn processing_job_aged(minutes: i64) -> Job {
        let mut job = Job::new(submission()).start();
        job.created_at = Utc::now() - chrono::Duration::minutes(minutes);
        job
    }

    #[tokio::test]
    async fn sweeps_processing_jobs_past_threshold() {
        let store = Arc::new(MemoryJobStore::new());
        let stalled = processing_job_aged(11);
        store.insert(stalled.clone()).await;

        let sweeper = StallSweeper::new(store.clone(), Duration::from_secs(600), 50);
        assert_eq!(sweeper.sweep().await.unwrap(), 1);

        let job = store.get(&stalled.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some(STALL_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn leaves_fresh_processing_jobs_alone() {
        let store = Arc::new(MemoryJobStore::new());
        let fresh = processing_job_aged(9);
        store.insert(fresh.clone()).await;

        let sweeper = StallSweeper::new(store.clone(), Duration::from_secs(600), 50);
        assert_eq!(sweeper.sweep().await.unwrap(), 0);

        let job = store.get(&fresh.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn ignores_old_terminal_jobs() {
        let store = Arc::new(MemoryJobStore::new());
        let mut done = Job::new(submission()).start().complete("x/output.mp4");
        done.created_at = Utc::now() - chrono::Duration::minutes(30);
        let id = done.id.clone();
        store.insert(done).await;

        let sweeper = StallSweeper::new(store.clone(), Duration::from_secs(600), 50);
        assert_eq!(sweeper.sweep().await.unwrap(), 0);

        let job = store.get(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }
}
