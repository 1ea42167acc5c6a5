//! Sampled clip artifacts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One clip sampled from the source media.
///
/// Clips are ordered by `index` ascending; index order is the
/// concatenation order during assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSegment {
    /// Position in the concatenation order
    pub index: usize,
    /// Offset into the source media where the clip starts, in seconds
    pub start_offset: f64,
    /// Clip length in seconds
    pub duration: f64,
    /// Path of the extracted clip artifact
    pub path: PathBuf,
}
