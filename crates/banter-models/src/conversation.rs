//! Conversation and speech artifact types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One scripted line of the generated conversation.
///
/// Turns are produced in a fixed order by the conversation generator;
/// that order defines downstream playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConversationTurn {
    /// Speaker label (e.g. "Speaker A")
    pub speaker: String,
    /// The spoken text
    pub text: String,
}

/// One rendered speech artifact, tied back to its conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// Index of the originating conversation turn
    pub turn_index: usize,
    /// Path of the rendered audio artifact
    pub audio_path: PathBuf,
}
