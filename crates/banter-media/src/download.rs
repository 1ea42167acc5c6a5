//! Source video download and metadata via yt-dlp.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Stream selection: best mp4 video (capped at 1080p) plus m4a audio,
/// falling back to the best single mp4 stream.
const FORMAT_SELECTOR: &str =
    "bestvideo[ext=mp4][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Download the source video for a job into the workspace.
///
/// The caller is expected to have stripped tracking parameters from the
/// URL already (see `banter_models::clean_source_url`). Fatal on any
/// yt-dlp failure or when no output file materializes; acquisition is
/// never retried.
pub async fn download_source(url: &str, output_path: impl AsRef<Path>) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    info!(
        url = %url,
        output = %output_path.display(),
        "Downloading source video"
    );

    let output = Command::new("yt-dlp")
        .arg("-f")
        .arg(FORMAT_SELECTOR)
        .arg("-o")
        .arg(output_path)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);
        return Err(MediaError::download_failed(format!(
            "yt-dlp failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    if !output_path.exists() {
        return Err(MediaError::download_failed("output file not created"));
    }

    let size = output_path.metadata()?.len();
    info!(
        output = %output_path.display(),
        size_mb = size as f64 / (1024.0 * 1024.0),
        "Downloaded source video"
    );
    Ok(())
}

/// Fetch the source video's title via a metadata-only yt-dlp query.
pub async fn fetch_source_title(url: &str) -> MediaResult<String> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

    let output = Command::new("yt-dlp")
        .arg("-j")
        .arg("--skip-download")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::metadata_failed(format!(
            "yt-dlp -j failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let title = info
        .get("title")
        .and_then(|t| t.as_str())
        .ok_or_else(|| MediaError::metadata_failed("no title in video metadata"))?;

    debug!(title = %title, "Fetched source title");
    Ok(title.to_string())
}
