//! Actions that run the conversion tool.

mod extract;

pub use extract::{build_extract_args, extract_audio, ExtractOutcome};
