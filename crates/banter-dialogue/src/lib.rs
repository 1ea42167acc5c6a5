//! AI adapters for the BanterClips pipeline.
//!
//! Two HTTP clients live here:
//! - `ConversationClient`: one chat-completion request that scripts the
//!   multi-speaker conversation about the source video
//! - `SpeechClient`: per-turn text-to-speech rendering
//!
//! Both are written against configurable base URLs so tests can point them
//! at a mock server.

pub mod conversation;
pub mod error;
pub mod speech;

pub use conversation::{speaker_labels, ConversationClient, ConversationClientConfig};
pub use error::{DialogueError, DialogueResult};
pub use speech::{voice_slot, SpeechClient, SpeechClientConfig};
