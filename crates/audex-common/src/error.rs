//! Common error types used throughout audex.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested audio format is not one of the supported targets.
    #[error("Unsupported audio format: {0} (expected one of mp3, aac, wav, flac)")]
    UnsupportedFormat(String),
}

impl Error {
    pub fn unsupported_format<S: Into<String>>(name: S) -> Self {
        Self::UnsupportedFormat(name.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
