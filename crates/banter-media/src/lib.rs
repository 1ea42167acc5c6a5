//! Media tooling for the BanterClips pipeline.
//!
//! This crate wraps the external tools the pipeline shells out to:
//! - yt-dlp for source download and metadata
//! - ffprobe for duration probing
//! - ffmpeg for clip extraction and final assembly
//!
//! All process invocations are async (`tokio::process`) so a pipeline run
//! never blocks its executor thread while a tool is working.

pub mod assemble;
pub mod command;
pub mod download;
pub mod error;
pub mod probe;
pub mod sampler;

pub use assemble::assemble_video;
pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand};
pub use download::{download_source, fetch_source_title};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use sampler::{clip_count, extract_clips};
