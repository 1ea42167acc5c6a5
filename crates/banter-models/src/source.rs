//! Source URL validation and video ID extraction.

use thiserror::Error;

/// Errors that can occur while validating a source reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceUrlError {
    #[error("URL is not a recognizable video-hosting URL")]
    UnrecognizedHost,

    #[error("video ID not found in URL")]
    VideoIdNotFound,

    #[error("video ID has invalid format")]
    InvalidVideoId,
}

/// Result type for source URL operations.
pub type SourceUrlResult<T> = Result<T, SourceUrlError>;

/// Strip trailing tracking parameters from a source URL.
///
/// Everything after the first `&` is dropped (playlist indices, timestamps
/// and similar parameters confuse the downloader).
pub fn clean_source_url(url: &str) -> &str {
    url.split('&').next().unwrap_or(url)
}

/// Extract the video ID from a source URL.
///
/// Supported shapes:
/// - `https://youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/shorts/VIDEO_ID`
/// - `https://youtube.com/embed/VIDEO_ID`
///
/// The ID must be exactly 11 characters of `[A-Za-z0-9_-]`.
pub fn extract_video_id(url: &str) -> SourceUrlResult<String> {
    let url = url.trim();

    if !is_video_host(url) {
        return Err(SourceUrlError::UnrecognizedHost);
    }

    if let Some(pos) = url.find("?v=").or_else(|| url.find("&v=")) {
        return validate_video_id(id_segment(&url[pos + 3..]));
    }

    for marker in ["youtu.be/", "/shorts/", "/embed/"] {
        if let Some(pos) = url.find(marker) {
            let start = pos + marker.len();
            if start >= url.len() {
                return Err(SourceUrlError::VideoIdNotFound);
            }
            return validate_video_id(id_segment(&url[start..]));
        }
    }

    Err(SourceUrlError::VideoIdNotFound)
}

fn is_video_host(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Take the ID portion of a URL segment, stopping at any delimiter.
fn id_segment(segment: &str) -> &str {
    let end = segment
        .find(|c| matches!(c, '?' | '&' | '#' | '/'))
        .unwrap_or(segment.len());
    &segment[..end]
}

fn validate_video_id(id: &str) -> SourceUrlResult<String> {
    if id.is_empty() {
        return Err(SourceUrlError::VideoIdNotFound);
    }
    let valid = id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(id.to_string())
    } else {
        Err(SourceUrlError::InvalidVideoId)
    }
}
