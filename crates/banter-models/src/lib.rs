//! Shared data models for the BanterClips backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, job configuration, and the job state machine
//! - Conversation turns and speech segments
//! - Sampled clip segments
//! - Source URL validation and video ID extraction

pub mod config;
pub mod conversation;
pub mod job;
pub mod segment;
pub mod source;

pub use config::{CommentaryStyle, ConversationSpeed, JobConfig, JobConfigError};
pub use conversation::{ConversationTurn, SpeechSegment};
pub use job::{Job, JobId, JobStatus, JobSubmission};
pub use segment::ClipSegment;
pub use source::{clean_source_url, extract_video_id, SourceUrlError, SourceUrlResult};
