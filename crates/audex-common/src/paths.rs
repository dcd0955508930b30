//! Path utilities for detecting video inputs and naming audio outputs.
//!
//! These are used by the input scanner, the extraction command builder and
//! the auto-detection of previously extracted files.

use crate::AudioFormat;
use std::path::{Path, PathBuf};

/// List of recognized video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Check if a path has a video file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use audex_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.MP4")));
/// assert!(!is_video_file(Path::new("song.mp3")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Name of the audio file extracted from `input`: `<stem>.<ext>`.
///
/// Returns `None` when the input has no usable file stem.
pub fn output_file_name(input: &Path, format: AudioFormat) -> Option<String> {
    let stem = input.file_stem()?.to_string_lossy();
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}.{}", stem, format.extension()))
}

/// Full output path for `input` under `output_dir`.
pub fn output_path(input: &Path, output_dir: &Path, format: AudioFormat) -> Option<PathBuf> {
    output_file_name(input, format).map(|name| output_dir.join(name))
}
