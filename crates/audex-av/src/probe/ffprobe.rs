//! FFprobe-based audio bitrate probing.

use super::types::*;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// Stream tags that may carry a bitrate, in lookup order.
const BITRATE_TAGS: [&str; 2] = ["BPS", "bit_rate"];

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

// ffprobe reports most numbers as strings; accept either form.
#[derive(Debug, Deserialize)]
struct FfprobeStream {
    bit_rate: Option<Value>,
    sample_rate: Option<Value>,
    channels: Option<Value>,
    #[serde(default)]
    tags: HashMap<String, Value>,
}

/// Run ffprobe against the first audio stream of `path` and return its JSON.
pub fn run_ffprobe(ffprobe: &Path, path: &Path) -> Result<String> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "a:0",
        ])
        .arg(path)
        .output()
        .map_err(|e| Error::spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed(
            "ffprobe",
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))
}

/// Probe the audio bitrate of `path`.
///
/// Never fails: any error running ffprobe or reading its output yields
/// `None`.
pub fn probe_audio_bitrate(ffprobe: &Path, path: &Path) -> Option<ProbedBitrate> {
    let result = run_ffprobe(ffprobe, path).and_then(|json| parse_probe_output(&json));

    match result {
        Ok(probed) => {
            #[cfg(feature = "tracing")]
            {
                match &probed {
                    Some(bitrate) => tracing::debug!("Probed {}: {}", path.display(), bitrate),
                    None => tracing::debug!("No audio bitrate information for {}", path.display()),
                }
            }
            probed
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to get audio bitrate for {}: {}", path.display(), _e);
            None
        }
    }
}

/// Derive a bitrate from ffprobe `-show_streams` JSON.
///
/// Precedence: stream `bit_rate`, then the `BPS` / `bit_rate` tags, then an
/// estimate from sample rate and channel count. The first source present
/// decides: if its value is not a number the result is `Ok(None)`, without
/// looking further. Also `Ok(None)` when the document has no audio stream or
/// none of these fields, or when the estimate overflows.
pub fn parse_probe_output(json: &str) -> Result<Option<ProbedBitrate>> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let Some(stream) = output.streams.into_iter().next() else {
        return Ok(None);
    };

    if let Some(value) = &stream.bit_rate {
        return Ok(as_u64(value).map(|bps| ProbedBitrate::new(bps, BitrateSource::Exact)));
    }

    if let Some(value) = BITRATE_TAGS.iter().find_map(|tag| stream.tags.get(*tag)) {
        return Ok(as_u64(value).map(|bps| ProbedBitrate::new(bps, BitrateSource::Tag)));
    }

    let (Some(sample_rate), Some(channels)) = (&stream.sample_rate, &stream.channels) else {
        return Ok(None);
    };
    let estimate = as_u64(sample_rate)
        .zip(as_u64(channels))
        .and_then(|(rate, channels)| rate.checked_mul(channels)?.checked_mul(16));

    Ok(estimate.map(|bps| ProbedBitrate::new(bps, BitrateSource::Estimated)))
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
