//! Deterministic clip sampling.
//!
//! Clips are cut from the source at fixed intervals, center-cropped to a
//! 9:16 vertical frame and scaled to 720x1280. Extraction is sequential:
//! each cut is an independent ffmpeg invocation against the same source
//! file writing into a shared directory, and index order must match the
//! later concatenation order.

use std::path::Path;
use tracing::info;

use banter_models::ClipSegment;

use crate::command::FfmpegCommand;
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// Vertical crop and scale applied to every clip.
const VERTICAL_FILTER: &str = "crop=ih*9/16:ih,scale=720:1280";

/// Number of clips to extract.
///
/// Capped both by what the source actually contains and by what is needed
/// to reach the requested output length:
/// `min(floor(duration / interval), ceil(target_length / interval))`.
pub fn clip_count(duration: f64, interval: f64, target_length: f64) -> usize {
    let available = (duration / interval).floor();
    let needed = (target_length / interval).ceil();
    available.min(needed).max(0.0) as usize
}

/// Extract a deterministic sequence of vertical clips from the source.
///
/// Clip `i` starts at `i * interval` and is `interval` seconds long,
/// written as `clip_{i}.mp4` into `clips_dir`. Any single extraction
/// failure is fatal; a partial clip set is never reused.
pub async fn extract_clips(
    source: impl AsRef<Path>,
    clips_dir: impl AsRef<Path>,
    interval: f64,
    target_length: f64,
) -> MediaResult<Vec<ClipSegment>> {
    let source = source.as_ref();
    let clips_dir = clips_dir.as_ref();

    let duration = probe_duration(source).await?;
    let count = clip_count(duration, interval, target_length);

    info!(
        source = %source.display(),
        duration = duration,
        interval = interval,
        target_length = target_length,
        clips = count,
        "Sampling clips from source"
    );

    let mut clips = Vec::with_capacity(count);
    for i in 0..count {
        let start_offset = i as f64 * interval;
        let path = clips_dir.join(format!("clip_{}.mp4", i));

        FfmpegCommand::new(source, &path)
            .seek(start_offset)
            .duration(interval)
            .video_filter(VERTICAL_FILTER)
            .run()
            .await?;

        clips.push(ClipSegment {
            index: i,
            start_offset,
            duration: interval,
            path,
        });
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_count_is_capped_by_source_and_target() {
        // Worked example: duration=42, interval=1.5, target=15
        // -> min(floor(28.0), ceil(10.0)) = 10
        assert_eq!(clip_count(42.0, 1.5, 15.0), 10);

        // Short source limits the count
        assert_eq!(clip_count(5.0, 2.0, 60.0), 2);

        // Target limits the count
        assert_eq!(clip_count(600.0, 1.0, 15.0), 15);

        // Fractional target rounds up
        assert_eq!(clip_count(600.0, 2.0, 15.0), 8);
    }

    #[test]
    fn test_clip_count_degenerate_sources() {
        assert_eq!(clip_count(0.0, 1.0, 15.0), 0);
        assert_eq!(clip_count(0.5, 1.0, 15.0), 0);
        assert_eq!(clip_count(1.0, 1.0, 15.0), 1);
    }
}
