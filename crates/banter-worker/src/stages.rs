//! Pipeline stage seams.
//!
//! Each stage of the pipeline sits behind a small trait so the
//! orchestrator can be exercised with scripted stand-ins. The production
//! implementations are thin adapters over the media, dialogue and
//! storage crates.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use banter_dialogue::{ConversationClient, SpeechClient};
use banter_models::{ClipSegment, ConversationTurn, JobConfig, SpeechSegment};
use banter_storage::Publisher;

use crate::error::{PipelineError, PipelineResult};

/// Downloads the source video and resolves its title.
#[async_trait]
pub trait MediaAcquirer: Send + Sync {
    /// Download the source to `dest` and return the video title.
    async fn acquire(&self, source_url: &str, dest: &Path) -> PipelineResult<String>;
}

/// Scripts the multi-speaker conversation about the video.
#[async_trait]
pub trait DialogueGenerator: Send + Sync {
    async fn generate(
        &self,
        video_title: &str,
        config: &JobConfig,
    ) -> PipelineResult<Vec<ConversationTurn>>;
}

/// Renders conversation turns as audio files.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        turns: &[ConversationTurn],
        out_dir: &Path,
    ) -> PipelineResult<Vec<SpeechSegment>>;
}

/// Samples vertical clips from the source at fixed intervals.
#[async_trait]
pub trait ClipSampler: Send + Sync {
    async fn sample(
        &self,
        source: &Path,
        clips_dir: &Path,
        config: &JobConfig,
    ) -> PipelineResult<Vec<ClipSegment>>;
}

/// Concatenates clips and speech into the final artifact.
#[async_trait]
pub trait Assembler: Send + Sync {
    async fn assemble(
        &self,
        clips: &[ClipSegment],
        speech: &[SpeechSegment],
        dest: &Path,
    ) -> PipelineResult<()>;
}

/// Uploads the finished artifact to object storage.
#[async_trait]
pub trait ArtifactPublisher: Send + Sync {
    async fn publish(&self, local_path: &Path, key: &str) -> PipelineResult<()>;
}

/// yt-dlp backed acquisition.
pub struct YtDlpAcquirer;

#[async_trait]
impl MediaAcquirer for YtDlpAcquirer {
    async fn acquire(&self, source_url: &str, dest: &Path) -> PipelineResult<String> {
        banter_media::download_source(source_url, dest)
            .await
            .map_err(|e| PipelineError::acquisition(e.to_string()))?;
        banter_media::fetch_source_title(source_url)
            .await
            .map_err(|e| PipelineError::acquisition(e.to_string()))
    }
}

/// Chat-completion backed conversation generation.
pub struct ChatDialogueGenerator {
    client: ConversationClient,
}

impl ChatDialogueGenerator {
    pub fn new(client: ConversationClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DialogueGenerator for ChatDialogueGenerator {
    async fn generate(
        &self,
        video_title: &str,
        config: &JobConfig,
    ) -> PipelineResult<Vec<ConversationTurn>> {
        self.client
            .generate(video_title, config)
            .await
            .map_err(|e| PipelineError::conversation(e.to_string()))
    }
}

/// Text-to-speech backed synthesis.
pub struct TtsSpeechSynthesizer {
    client: SpeechClient,
}

impl TtsSpeechSynthesizer {
    pub fn new(client: SpeechClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsSpeechSynthesizer {
    async fn synthesize(
        &self,
        turns: &[ConversationTurn],
        out_dir: &Path,
    ) -> PipelineResult<Vec<SpeechSegment>> {
        self.client
            .synthesize_turns(turns, out_dir)
            .await
            .map_err(|e| PipelineError::speech(e.to_string()))
    }
}

/// ffmpeg backed clip sampling.
pub struct FfmpegClipSampler;

#[async_trait]
impl ClipSampler for FfmpegClipSampler {
    async fn sample(
        &self,
        source: &Path,
        clips_dir: &Path,
        config: &JobConfig,
    ) -> PipelineResult<Vec<ClipSegment>> {
        banter_media::extract_clips(source, clips_dir, config.clip_interval, config.target_length)
            .await
            .map_err(|e| PipelineError::sampling(e.to_string()))
    }
}

/// ffmpeg backed assembly.
pub struct FfmpegAssembler;

#[async_trait]
impl Assembler for FfmpegAssembler {
    async fn assemble(
        &self,
        clips: &[ClipSegment],
        speech: &[SpeechSegment],
        dest: &Path,
    ) -> PipelineResult<()> {
        banter_media::assemble_video(clips, speech, dest)
            .await
            .map(|_| ())
            .map_err(|e| PipelineError::assembly(e.to_string()))
    }
}

/// Object-storage backed publication.
pub struct StoragePublisher {
    publisher: Arc<Publisher>,
}

impl StoragePublisher {
    pub fn new(publisher: Arc<Publisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl ArtifactPublisher for StoragePublisher {
    async fn publish(&self, local_path: &Path, key: &str) -> PipelineResult<()> {
        self.publisher
            .publish_file(local_path, key, "video/mp4")
            .await
            .map_err(|e| PipelineError::publication(e.to_string()))
    }
}
