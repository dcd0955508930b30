//! # audex-av
//!
//! Thin, synchronous wrappers around the external media toolchain.
//!
//! This crate provides functionality for:
//! - Locating `ffmpeg` and `ffprobe` ([`tools`])
//! - Probing the first audio stream of a file for its bitrate ([`probe`])
//! - Choosing an encode bitrate that never exceeds the source ([`quality`])
//! - Running one `ffmpeg` extraction per input file ([`actions`])
//!
//! ## Features
//!
//! - `tracing` - Emit diagnostics through the `tracing` crate
//!
//! ## Example
//!
//! ```no_run
//! use audex_av::{extract_audio, probe_audio_bitrate, resolve_quality, ToolPaths};
//! use audex_common::AudioFormat;
//! use std::path::Path;
//!
//! let tools = ToolPaths::discover(None, None)?;
//! let input = Path::new("/videos/talk.mkv");
//! let probed = probe_audio_bitrate(&tools.ffprobe, input);
//! let quality = resolve_quality("192k", probed.as_ref(), AudioFormat::Mp3);
//! let outcome = extract_audio(&tools.ffmpeg, input, Path::new("/audio"), AudioFormat::Mp3, &quality)?;
//! println!("wrote {}", outcome.output_path.display());
//! # Ok::<(), audex_av::Error>(())
//! ```

mod error;
pub mod actions;
pub mod probe;
pub mod quality;
pub mod tools;

// Re-exports
pub use actions::{extract_audio, ExtractOutcome};
pub use error::{Error, Result};
pub use probe::{probe_audio_bitrate, BitrateSource, ProbedBitrate};
pub use quality::{resolve_quality, QualitySpec};
pub use tools::{check_tool, check_tools, ToolInfo, ToolPaths};
