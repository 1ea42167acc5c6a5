//! Pipeline orchestration for BanterClips jobs.
//!
//! The orchestrator claims pending jobs from the store and runs each one
//! through the fixed stage sequence, recording the terminal outcome back
//! on the job. Stage implementations live behind traits in [`stages`] so
//! the control flow can be tested without external tools or services.

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod stages;
pub mod workspace;

pub use config::WorkerConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::JobLogger;
pub use pipeline::{Orchestrator, PipelineStages};
pub use stages::{
    ArtifactPublisher, Assembler, ChatDialogueGenerator, ClipSampler, DialogueGenerator,
    FfmpegAssembler, FfmpegClipSampler, MediaAcquirer, SpeechSynthesizer, StoragePublisher,
    TtsSpeechSynthesizer, YtDlpAcquirer,
};
pub use workspace::{Workspace, WorkspaceManager};

use std::sync::Arc;

use banter_dialogue::{ConversationClient, SpeechClient};
use banter_storage::{BucketClient, Publisher};
use banter_store::JobStore;

/// Build an orchestrator wired to the production stage implementations,
/// configured from the environment.
pub fn production_orchestrator(
    store: Arc<dyn JobStore>,
    config: &WorkerConfig,
) -> anyhow::Result<Arc<Orchestrator>> {
    let bucket = BucketClient::from_env()?;
    let publisher = Arc::new(Publisher::new(Arc::new(bucket)));

    let stages = PipelineStages {
        acquirer: Arc::new(YtDlpAcquirer),
        dialogue: Arc::new(ChatDialogueGenerator::new(ConversationClient::from_env()?)),
        speech: Arc::new(TtsSpeechSynthesizer::new(SpeechClient::from_env()?)),
        sampler: Arc::new(FfmpegClipSampler),
        assembler: Arc::new(FfmpegAssembler),
        publisher: Arc::new(StoragePublisher::new(publisher)),
    };

    Ok(Arc::new(Orchestrator::new(
        store,
        stages,
        WorkspaceManager::new(config.work_dir.clone()),
    )))
}
