//! The job store interface consumed by the pipeline and the API.

use async_trait::async_trait;

use banter_models::{Job, JobId, JobSubmission};

use crate::error::StoreResult;

/// Persisted job records and status transitions.
///
/// All updates are point writes keyed by job id; the pipeline does not
/// assume multi-row atomicity from an implementation. The one exception is
/// `claim_oldest_pending`, which must be atomic: it may only move a job to
/// `processing` while that job is still `pending`, so two concurrent
/// dispatchers can never claim the same job.
///
/// Terminal states are sticky. Implementations must refuse to move a
/// `completed` or `failed` job anywhere else; such writes are dropped with
/// a warning rather than raised, since they only occur in benign races
/// (e.g. the stall sweeper losing to a finishing pipeline run).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new pending job built from a validated submission.
    async fn enqueue(&self, submission: JobSubmission) -> StoreResult<Job>;

    /// Fetch a job by id.
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Atomically claim the oldest pending job, moving it to `processing`.
    ///
    /// Returns `None` when no pending job exists.
    async fn claim_oldest_pending(&self) -> StoreResult<Option<Job>>;

    /// Move a pending job to `processing`.
    async fn mark_processing(&self, id: &JobId) -> StoreResult<()>;

    /// Move a processing job to `completed`, recording the artifact key.
    async fn mark_completed(&self, id: &JobId, output_path: &str) -> StoreResult<()>;

    /// Move a processing job to `failed`, recording the error message.
    async fn mark_failed(&self, id: &JobId, message: &str) -> StoreResult<()>;

    /// The `limit` most recently created jobs, newest first.
    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<Job>>;
}
