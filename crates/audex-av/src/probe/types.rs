//! Probe result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a probed bitrate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitrateSource {
    /// The stream's own `bit_rate` field.
    Exact,
    /// A bitrate tag in the stream metadata (`BPS` or `bit_rate`).
    Tag,
    /// `sample_rate * channels * 16`, assuming 16-bit samples.
    Estimated,
}

impl fmt::Display for BitrateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Tag => write!(f, "tag"),
            Self::Estimated => write!(f, "estimated"),
        }
    }
}

/// Bitrate of the first audio stream of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedBitrate {
    /// Bits per second.
    pub bps: u64,
    /// How the value was obtained.
    pub source: BitrateSource,
}

impl ProbedBitrate {
    pub fn new(bps: u64, source: BitrateSource) -> Self {
        Self { bps, source }
    }

    /// Whole kilobits per second, rounded down.
    pub fn kbps(&self) -> u64 {
        self.bps / 1000
    }
}

impl fmt::Display for ProbedBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps ({}k, {})", self.bps, self.kbps(), self.source)
    }
}
