//! Errors raised while probing or extracting.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of one ffprobe or ffmpeg invocation.
///
/// Unknown output formats never get this far: they are rejected when the
/// name is parsed into an [`audex_common::AudioFormat`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The executable is neither at its configured path nor on `PATH`.
    #[error("{tool} not found")]
    ToolNotFound { tool: String },

    /// The tool ran and exited unsuccessfully. `message` carries its stderr.
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("unreadable {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The input video does not exist; nothing was spawned.
    #[error("input not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The input path has no file stem to name the audio file after.
    #[error("cannot name audio output for {}", path.display())]
    NoOutputName { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid ffprobe JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Map a spawn failure of `tool`: a missing executable becomes
    /// [`Error::ToolNotFound`], anything else stays an I/O error.
    pub(crate) fn spawn(tool: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::tool_not_found(tool)
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_tool() {
        assert_eq!(Error::tool_not_found("ffprobe").to_string(), "ffprobe not found");
        assert_eq!(
            Error::tool_failed("ffmpeg", "exited with 1").to_string(),
            "ffmpeg failed: exited with 1"
        );
    }

    #[test]
    fn test_spawn_not_found_is_missing_tool() {
        let err = Error::spawn("ffmpeg", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(err, Error::ToolNotFound { ref tool } if tool == "ffmpeg"));

        let err = Error::spawn(
            "ffmpeg",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, Error::Io(_)));
    }
}
