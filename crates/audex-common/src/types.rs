//! Core type definitions shared by the probing, extraction and ledger layers.
//!
//! Formats are serialized in lowercase, which is also the form used for
//! output file extensions and ledger file names.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target audio format for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Layer III, encoded with libmp3lame.
    #[default]
    Mp3,
    /// Advanced Audio Coding, encoded with the native ffmpeg encoder.
    Aac,
    /// Uncompressed 16-bit PCM at 44.1 kHz.
    Wav,
    /// Free Lossless Audio Codec.
    Flac,
}

impl AudioFormat {
    /// Lowercase name, doubling as the output file extension.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Aac => "aac",
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }

    /// Output file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Lossy formats encoded at a target bitrate. Wav and flac ignore
    /// quality, and adaptive resolution passes the source rate through for them.
    pub fn uses_bitrate(&self) -> bool {
        matches!(self, Self::Mp3 | Self::Aac)
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "aac" => Ok(Self::Aac),
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            _ => Err(Error::unsupported_format(s)),
        }
    }
}
