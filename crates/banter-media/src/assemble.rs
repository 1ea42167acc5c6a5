//! Final video assembly.
//!
//! Three ffmpeg steps:
//! 1. Concatenate clips in index order via lossless stream copy into a
//!    silent intermediate video.
//! 2. Concatenate the speech segments in turn order into one audio track.
//! 3. Mux the audio over the video, truncating to the shorter stream
//!    (shortest-stream policy).

use std::path::{Path, PathBuf};
use tracing::info;

use banter_models::{ClipSegment, SpeechSegment};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Render a concat demuxer list file for a set of media paths.
///
/// Single quotes inside paths are escaped the way the concat demuxer
/// expects (`'` becomes `'\''`).
fn concat_list(paths: impl IntoIterator<Item = PathBuf>) -> String {
    paths
        .into_iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', r"'\''");
            format!("file '{}'", escaped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Concatenate clips and speech into the final muxed artifact at `dest`.
///
/// Clips must be ordered by index and speech segments by turn index; the
/// caller owns that ordering, assembly preserves it. Intermediate files
/// are written next to `dest` inside the workspace and removed with it.
pub async fn assemble_video(
    clips: &[ClipSegment],
    speech: &[SpeechSegment],
    dest: impl AsRef<Path>,
) -> MediaResult<PathBuf> {
    let dest = dest.as_ref();
    let work_dir = dest
        .parent()
        .ok_or_else(|| MediaError::InvalidVideo("destination has no parent directory".into()))?;

    if clips.is_empty() {
        return Err(MediaError::InvalidVideo("no clips to assemble".into()));
    }
    if speech.is_empty() {
        return Err(MediaError::InvalidVideo("no speech segments to assemble".into()));
    }

    info!(
        clips = clips.len(),
        speech_segments = speech.len(),
        dest = %dest.display(),
        "Assembling final video"
    );

    // 1. Silent video concat (stream copy, no re-encode)
    let video_list = work_dir.join("concat.txt");
    tokio::fs::write(
        &video_list,
        concat_list(clips.iter().map(|c| c.path.clone())),
    )
    .await?;

    let silent_video = work_dir.join("silent.mp4");
    FfmpegCommand::to_output(&silent_video)
        .input_arg("-f")
        .input_arg("concat")
        .input_arg("-safe")
        .input_arg("0")
        .input(&video_list)
        .video_codec("copy")
        .no_audio()
        .run()
        .await?;

    // 2. Speech concat into one audio track
    let audio_list = work_dir.join("audio_concat.txt");
    tokio::fs::write(
        &audio_list,
        concat_list(speech.iter().map(|s| s.audio_path.clone())),
    )
    .await?;

    let audio_track = work_dir.join("speech.mp3");
    FfmpegCommand::to_output(&audio_track)
        .input_arg("-f")
        .input_arg("concat")
        .input_arg("-safe")
        .input_arg("0")
        .input(&audio_list)
        .run()
        .await?;

    // 3. Mux, shortest stream wins
    FfmpegCommand::to_output(dest)
        .input(&silent_video)
        .input(&audio_track)
        .video_codec("copy")
        .audio_codec("aac")
        .shortest()
        .run()
        .await?;

    info!(dest = %dest.display(), "Assembled final video");
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_list_preserves_order() {
        let list = concat_list(vec![
            PathBuf::from("/w/clips/clip_0.mp4"),
            PathBuf::from("/w/clips/clip_1.mp4"),
            PathBuf::from("/w/clips/clip_2.mp4"),
        ]);
        assert_eq!(
            list,
            "file '/w/clips/clip_0.mp4'\nfile '/w/clips/clip_1.mp4'\nfile '/w/clips/clip_2.mp4'"
        );
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let list = concat_list(vec![PathBuf::from("/w/it's/clip_0.mp4")]);
        assert_eq!(list, r"file '/w/it'\''s/clip_0.mp4'");
    }
}
