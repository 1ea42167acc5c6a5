//! Per-job workspace lifecycle.
//!
//! Every pipeline run gets its own directory under the worker's work
//! root, named after the job id. The directory is created before the
//! first stage runs and removed after the job reaches a terminal state,
//! whether it completed or failed.

use std::path::{Path, PathBuf};

use banter_models::JobId;
use tracing::warn;

use crate::error::PipelineResult;

/// Creates and tears down per-job workspaces.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the workspace for a job. Idempotent: an existing directory
    /// from a crashed earlier run is reused as-is.
    pub async fn prepare(&self, job_id: &JobId) -> PipelineResult<Workspace> {
        let dir = self.root.join(job_id.as_str());
        let clips_dir = dir.join("clips");
        tokio::fs::create_dir_all(&clips_dir).await?;
        Ok(Workspace { dir, clips_dir })
    }
}

/// A job's scratch directory and its well-known paths.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
    clips_dir: PathBuf,
}

impl Workspace {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    /// Where the downloaded source video lands.
    pub fn source_path(&self) -> PathBuf {
        self.dir.join("source.mp4")
    }

    /// Where the assembled output is written before publication.
    pub fn output_path(&self) -> PathBuf {
        self.dir.join("output.mp4")
    }

    /// Remove the workspace directory and everything in it.
    ///
    /// Teardown failures are logged and swallowed; a leaked scratch
    /// directory must never change a job's outcome.
    pub async fn teardown(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Workspace teardown failed");
        }
    }
}
