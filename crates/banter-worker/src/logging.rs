//! Structured job logging.

use banter_models::JobId;
use tracing::{error, info, warn};

/// Logger that stamps every line with the job id and current stage.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId) -> Self {
        Self {
            job_id: job_id.to_string(),
        }
    }

    /// Log entry into a pipeline stage.
    pub fn stage(&self, stage: &str) {
        info!(job_id = %self.job_id, stage = %stage, "Stage started");
    }

    pub fn progress(&self, stage: &str, message: &str) {
        info!(job_id = %self.job_id, stage = %stage, "{}", message);
    }

    pub fn warning(&self, stage: &str, message: &str) {
        warn!(job_id = %self.job_id, stage = %stage, "{}", message);
    }

    pub fn failure(&self, stage: &str, message: &str) {
        error!(job_id = %self.job_id, stage = %stage, "{}", message);
    }

    pub fn completed(&self, output_path: &str) {
        info!(job_id = %self.job_id, output_path = %output_path, "Job completed");
    }
}
