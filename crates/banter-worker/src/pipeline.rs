//! Job pipeline orchestration.
//!
//! The orchestrator claims one pending job at a time and drives it
//! through the fixed stage sequence: acquire source, generate the
//! conversation, synthesize speech, sample clips, assemble, publish.
//! Stage failures mark the job failed with the stage's message; the
//! workspace is torn down exactly once on every path out.

use std::sync::Arc;

use tracing::{error, info};

use banter_models::{Job, JobId};
use banter_store::JobStore;

use crate::error::PipelineResult;
use crate::logging::JobLogger;
use crate::stages::{
    ArtifactPublisher, Assembler, ClipSampler, DialogueGenerator, MediaAcquirer, SpeechSynthesizer,
};
use crate::workspace::{Workspace, WorkspaceManager};

/// The stage implementations the orchestrator runs.
pub struct PipelineStages {
    pub acquirer: Arc<dyn MediaAcquirer>,
    pub dialogue: Arc<dyn DialogueGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub sampler: Arc<dyn ClipSampler>,
    pub assembler: Arc<dyn Assembler>,
    pub publisher: Arc<dyn ArtifactPublisher>,
}

/// Claims and runs jobs against a store.
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    stages: PipelineStages,
    workspaces: WorkspaceManager,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        stages: PipelineStages,
        workspaces: WorkspaceManager,
    ) -> Self {
        Self {
            store,
            stages,
            workspaces,
        }
    }

    /// Claim the oldest pending job and run it to a terminal state.
    ///
    /// Returns the claimed job's id, or `None` when nothing was pending.
    /// Stage failures are recorded on the job, not returned; only claim
    /// errors from the store propagate.
    pub async fn run_once(&self) -> PipelineResult<Option<JobId>> {
        let Some(job) = self.store.claim_oldest_pending().await? else {
            return Ok(None);
        };
        let id = job.id.clone();
        self.process(job).await;
        Ok(Some(id))
    }

    /// Claim the oldest pending job and run it in a background task.
    ///
    /// The caller gets the claimed id immediately; the pipeline outcome
    /// lands in the store, never back on this call path.
    pub async fn dispatch(self: &Arc<Self>) -> PipelineResult<Option<JobId>> {
        let Some(job) = self.store.claim_oldest_pending().await? else {
            return Ok(None);
        };
        let id = job.id.clone();
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            orchestrator.process(job).await;
        });
        Ok(Some(id))
    }

    /// Run a claimed job through every stage and record the outcome.
    async fn process(&self, job: Job) {
        let logger = JobLogger::new(&job.id);
        info!(job_id = %job.id, source_url = %job.source_url, "Processing job");

        let workspace = match self.workspaces.prepare(&job.id).await {
            Ok(ws) => ws,
            Err(e) => {
                self.record_failure(&job.id, &logger, "workspace", &e.to_string())
                    .await;
                return;
            }
        };

        match self.run_stages(&job, &workspace, &logger).await {
            Ok(output_key) => {
                logger.completed(&output_key);
                if let Err(e) = self.store.mark_completed(&job.id, &output_key).await {
                    error!(job_id = %job.id, error = %e, "Failed to record completion");
                }
            }
            Err(e) => {
                self.record_failure(&job.id, &logger, "pipeline", &e.to_string())
                    .await;
            }
        }

        workspace.teardown().await;
    }

    async fn run_stages(
        &self,
        job: &Job,
        workspace: &Workspace,
        logger: &JobLogger,
    ) -> PipelineResult<String> {
        logger.stage("acquisition");
        let source_path = workspace.source_path();
        let title = self
            .stages
            .acquirer
            .acquire(&job.source_url, &source_path)
            .await?;
        logger.progress("acquisition", &format!("Source ready: {}", title));

        logger.stage("conversation");
        let turns = self.stages.dialogue.generate(&title, &job.config).await?;
        logger.progress("conversation", &format!("{} turns generated", turns.len()));

        logger.stage("speech");
        let speech = self
            .stages
            .speech
            .synthesize(&turns, workspace.dir())
            .await?;
        logger.progress("speech", &format!("{} segments rendered", speech.len()));

        logger.stage("sampling");
        let clips = self
            .stages
            .sampler
            .sample(&source_path, workspace.clips_dir(), &job.config)
            .await?;
        logger.progress("sampling", &format!("{} clips extracted", clips.len()));

        logger.stage("assembly");
        let output_path = workspace.output_path();
        self.stages
            .assembler
            .assemble(&clips, &speech, &output_path)
            .await?;

        logger.stage("publication");
        let output_key = format!("{}/output.mp4", job.id);
        self.stages
            .publisher
            .publish(&output_path, &output_key)
            .await?;

        Ok(output_key)
    }

    async fn record_failure(&self, id: &JobId, logger: &JobLogger, stage: &str, message: &str) {
        logger.failure(stage, message);
        if let Err(e) = self.store.mark_failed(id, message).await {
            error!(job_id = %id, error = %e, "Failed to record job failure");
        }
    }
}
