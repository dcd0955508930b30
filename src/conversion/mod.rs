//! Audio extraction batches.
//!
//! - [`Extractor`] turns one work item into an audio file
//! - [`FfmpegExtractor`] does so with `ffprobe` and `ffmpeg`
//! - [`BatchScheduler`] runs the pending items of a directory on a bounded
//!   pool of workers and keeps the ledger up to date

mod executor;
mod scheduler;

pub use executor::{ExtractSettings, Extractor, FfmpegExtractor};
pub use scheduler::{concurrency_bound, shutdown_signal, BatchReport, BatchScheduler};
