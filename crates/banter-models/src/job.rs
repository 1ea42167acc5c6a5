//! Job definitions and the persisted job state machine.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::JobConfig;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted job status.
///
/// Transitions form a DAG: `pending -> processing -> {completed, failed}`.
/// Terminal states are sticky; a job never leaves `completed` or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is waiting to be claimed
    #[default]
    Pending,
    /// Job is being processed by a pipeline run
    Processing,
    /// Job finished and the output artifact was published
    Completed,
    /// Job hit a terminal error
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated job submission, ready to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobSubmission {
    /// Source media URL as submitted (tracking parameters included)
    pub source_url: String,
    /// Video ID extracted from the source URL
    pub source_id: String,
    /// Pipeline configuration
    pub config: JobConfig,
}

/// A commentary video generation job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Source media URL
    pub source_url: String,

    /// Video ID extracted from the source URL
    pub source_id: String,

    /// Job status
    #[serde(default)]
    pub status: JobStatus,

    /// Pipeline configuration
    pub config: JobConfig,

    /// Storage key of the published artifact (set only when completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Terminal error message (set only when failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Creation timestamp (immutable)
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Create a new pending job from a validated submission.
    pub fn new(submission: JobSubmission) -> Self {
        Self {
            id: JobId::new(),
            source_url: submission.source_url,
            source_id: submission.source_id,
            status: JobStatus::Pending,
            config: submission.config,
            output_path: None,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Mark the job as claimed by a pipeline run.
    pub fn start(mut self) -> Self {
        self.status = JobStatus::Processing;
        self
    }

    /// Mark the job as completed with the published artifact key.
    pub fn complete(mut self, output_path: impl Into<String>) -> Self {
        self.status = JobStatus::Completed;
        self.output_path = Some(output_path.into());
        self
    }

    /// Mark the job as failed with a human-readable message.
    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = JobStatus::Failed;
        self.error_message = Some(error.into());
        self
    }

    /// Elapsed time since the job was created.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentaryStyle, ConversationSpeed};

    fn submission() -> JobSubmission {
        JobSubmission {
            source_url: "https://youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
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

    #[test]
    fn test_job_creation() {
        let job = Job::new(submission());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.source_id, "dQw4w9WgXcQ");
        assert!(job.output_path.is_none());
        assert!(job.error_message.is_none());
    }

    #[test]
    fn test_job_lifecycle() {
        let job = Job::new(submission());

        let started = job.start();
        assert_eq!(started.status, JobStatus::Processing);

        let completed = started.complete("abc/output.mp4");
        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.output_path.as_deref(), Some("abc/output.mp4"));
    }

    #[test]
    fn test_job_failure() {
        let job = Job::new(submission()).start().fail("download exploded");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("download exploded"));
    }

    #[test]
    fn test_status_transitions_form_a_dag() {
        use JobStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        // No re-entry into pending or processing
        for terminal in [Completed, Failed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Processing, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Pending));
    }
}
