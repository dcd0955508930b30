//! Audio track extraction with ffmpeg.

use crate::{Error, Result};
use audex_common::{paths, AudioFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Sample rate used for wav output.
const WAV_SAMPLE_RATE: &str = "44100";

/// Result of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    /// The file that was written.
    pub output_path: PathBuf,
    /// The quality string passed to the encoder (recorded even for formats
    /// that ignore it).
    pub quality: String,
}

/// Build the ffmpeg argument list for one extraction.
///
/// `-vn` drops video, `-y` overwrites an existing output.
pub fn build_extract_args(
    input: &Path,
    output: &Path,
    format: AudioFormat,
    quality: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.into(), "-vn".into()];

    let codec = match format {
        AudioFormat::Mp3 => vec!["-acodec", "libmp3lame", "-ab", quality],
        AudioFormat::Aac => vec!["-acodec", "aac", "-b:a", quality],
        AudioFormat::Wav => vec!["-acodec", "pcm_s16le", "-ar", WAV_SAMPLE_RATE],
        AudioFormat::Flac => vec!["-acodec", "flac"],
    };
    args.extend(codec.into_iter().map(OsString::from));

    args.push("-y".into());
    args.push(output.into());
    args
}

/// Extract the audio of `input` into `<output_dir>/<stem>.<ext>`.
///
/// No retries. On a non-zero exit the partially written output, if any, is
/// left where it is.
///
/// # Errors
///
/// - [`Error::FileNotFound`] if the input does not exist (nothing is spawned).
/// - [`Error::NoOutputName`] if the input has no file stem.
/// - [`Error::ToolNotFound`] if `ffmpeg` cannot be spawned.
/// - [`Error::ToolFailed`] with ffmpeg's stderr on a non-zero exit.
pub fn extract_audio(
    ffmpeg: &Path,
    input: &Path,
    output_dir: &Path,
    format: AudioFormat,
    quality: &str,
) -> Result<ExtractOutcome> {
    if !input.exists() {
        return Err(Error::file_not_found(input));
    }

    let output_path = paths::output_path(input, output_dir, format)
        .ok_or_else(|| Error::NoOutputName { path: input.to_path_buf() })?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Extracting {} -> {} ({}, {})",
        input.display(),
        output_path.display(),
        format,
        quality
    );

    let output = Command::new(ffmpeg)
        .args(build_extract_args(input, &output_path, format, quality))
        .output()
        .map_err(|e| Error::spawn("ffmpeg", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed(
            "ffmpeg",
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(ExtractOutcome {
        output_path,
        quality: quality.to_string(),
    })
}
