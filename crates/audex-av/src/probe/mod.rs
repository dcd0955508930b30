//! Audio bitrate probing.
//!
//! The prober is deliberately lossy: every failure mode collapses into
//! `None`, which callers read as "no information" rather than as an error.

mod ffprobe;
mod types;

pub use ffprobe::{parse_probe_output, probe_audio_bitrate, run_ffprobe};
pub use types::*;
