//! Audex-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across audex:
//!
//! - **Core Types**: The [`AudioFormat`] enum for extraction targets
//! - **Path Utilities**: Functions to detect video inputs by extension and
//!   derive output file names
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use audex_common::AudioFormat;
//! use audex_common::paths::{is_video_file, output_file_name};
//! use std::path::Path;
//!
//! let format: AudioFormat = "flac".parse().unwrap();
//! assert!(is_video_file(Path::new("lecture.mkv")));
//! assert_eq!(
//!     output_file_name(Path::new("lecture.mkv"), format).as_deref(),
//!     Some("lecture.flac")
//! );
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
