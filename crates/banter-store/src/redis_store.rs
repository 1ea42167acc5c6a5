//! Redis-backed job store.
//!
//! Layout:
//! - `banter:job:{id}` holds the serialized job record
//! - `banter:jobs:pending` is a sorted set of pending job ids scored by
//!   creation time (claim order)
//! - `banter:jobs:recent` is a sorted set of all job ids scored by creation
//!   time (listing order)
//!
//! The claim runs as a Lua script so the pending check and the move to
//! `processing` are one atomic step. Two dispatchers racing on `run_once`
//! get two different jobs or one job and `None`, never the same job twice.

use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::{debug, warn};

use banter_models::{Job, JobId, JobStatus, JobSubmission};

use crate::error::{StoreError, StoreResult};
use crate::store::JobStore;

/// Atomic claim of the oldest pending job.
///
/// KEYS[1] = pending zset, ARGV[1] = job key prefix.
/// Returns the updated job record, or nil when nothing is claimable.
const CLAIM_SCRIPT: &str = r#"
local id = redis.call('ZRANGE', KEYS[1], 0, 0)[1]
if not id then
  return nil
end
local key = ARGV[1] .. id
local raw = redis.call('GET', key)
if not raw then
  redis.call('ZREM', KEYS[1], id)
  return nil
end
local job = cjson.decode(raw)
if job['status'] ~= 'pending' then
  redis.call('ZREM', KEYS[1], id)
  return nil
end
job['status'] = 'processing'
local updated = cjson.encode(job)
redis.call('SET', key, updated)
redis.call('ZREM', KEYS[1], id)
return updated
"#;

/// Configuration for the Redis job store.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis URL
    pub redis_url: String,
    /// Key prefix for job records
    pub job_key_prefix: String,
    /// Sorted set of pending job ids
    pub pending_set: String,
    /// Sorted set of all job ids by creation time
    pub recent_set: String,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            job_key_prefix: "banter:job:".to_string(),
            pending_set: "banter:jobs:pending".to_string(),
            recent_set: "banter:jobs:recent".to_string(),
        }
    }
}

impl RedisStoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            ..Self::default()
        }
    }
}

/// Redis-backed `JobStore` implementation.
pub struct RedisJobStore {
    client: redis::Client,
    config: RedisStoreConfig,
    claim_script: Script,
}

impl RedisJobStore {
    /// Create a new Redis job store.
    pub fn new(config: RedisStoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self {
            client,
            config,
            claim_script: Script::new(CLAIM_SCRIPT),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(RedisStoreConfig::from_env())
    }

    fn job_key(&self, id: &JobId) -> String {
        format!("{}{}", self.config.job_key_prefix, id)
    }

    async fn connection(&self) -> StoreResult<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    async fn load(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        id: &JobId,
    ) -> StoreResult<Option<Job>> {
        let raw: Option<String> = conn.get(self.job_key(id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        job: &Job,
    ) -> StoreResult<()> {
        let raw = serde_json::to_string(job)?;
        conn.set::<_, _, ()>(self.job_key(&job.id), raw).await?;
        Ok(())
    }

    /// Guarded status transition. Marks other than the claim are point
    /// writes (last-writer-wins), but a terminal record is never replaced.
    async fn transition<F>(&self, id: &JobId, next: JobStatus, apply: F) -> StoreResult<()>
    where
        F: FnOnce(Job) -> Job,
    {
        let mut conn = self.connection().await?;
        let job = self
            .load(&mut conn, id)
            .await?
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

        self.save(&mut conn, &apply(job)).await?;
        if next != JobStatus::Processing {
            // Terminal record, make sure it can no longer be claimed
            conn.zrem::<_, _, ()>(&self.config.pending_set, id.as_str())
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn enqueue(&self, submission: JobSubmission) -> StoreResult<Job> {
        let job = Job::new(submission);
        let mut conn = self.connection().await?;
        let score = job.created_at.timestamp_millis() as f64;

        self.save(&mut conn, &job).await?;
        conn.zadd::<_, _, _, ()>(&self.config.pending_set, job.id.as_str(), score)
            .await?;
        conn.zadd::<_, _, _, ()>(&self.config.recent_set, job.id.as_str(), score)
            .await?;

        debug!(job_id = %job.id, source_id = %job.source_id, "Enqueued job");
        Ok(job)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let mut conn = self.connection().await?;
        self.load(&mut conn, id).await
    }

    async fn claim_oldest_pending(&self) -> StoreResult<Option<Job>> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = self
            .claim_script
            .key(&self.config.pending_set)
            .arg(&self.config.job_key_prefix)
            .invoke_async(&mut conn)
            .await?;

        match raw {
            Some(raw) => {
                let job: Job = serde_json::from_str(&raw)?;
                debug!(job_id = %job.id, "Claimed pending job");
                Ok(Some(job))
            }
            None => Ok(None),
        }
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
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let ids: Vec<String> = conn
            .zrevrange(&self.config.recent_set, 0, limit as isize - 1)
            .await?;

        let mut jobs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(job) = self.load(&mut conn, &JobId::from_string(id)).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }
}
