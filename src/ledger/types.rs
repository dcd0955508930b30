use audex_common::AudioFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Completed,
}

/// How a completion came to be known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detection {
    /// Extracted by a run of this tool.
    #[default]
    Run,
    /// Inferred from an existing, non-empty output file.
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub status: RecordStatus,
    pub output_file: PathBuf,
    pub audio_format: AudioFormat,
    /// Quality actually passed to the encoder; unknown for auto-detected files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default)]
    pub detected: Detection,
    /// Written as RFC 3339. Also read as seconds since the epoch, either a
    /// JSON number or a numeric string such as `"1718000000.123"`.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl CompletionRecord {
    /// Record for a file this run just extracted.
    pub fn converted(output_file: PathBuf, audio_format: AudioFormat, quality: String) -> Self {
        Self {
            status: RecordStatus::Completed,
            output_file,
            audio_format,
            quality: Some(quality),
            detected: Detection::Run,
            timestamp: Utc::now(),
        }
    }

    /// Record synthesized from an output file found on disk.
    pub fn auto_detected(
        output_file: PathBuf,
        audio_format: AudioFormat,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status: RecordStatus::Completed,
            output_file,
            audio_format,
            quality: None,
            detected: Detection::Auto,
            timestamp,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => parse_timestamp(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {text:?}"))),
        Raw::Seconds(secs) => from_epoch_seconds(secs)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {secs}"))),
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    text.trim().parse::<f64>().ok().and_then(from_epoch_seconds)
}

fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs < 0.0 || secs > i64::MAX as f64 {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs.fract() * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole, nanos)
}
