use audex_common::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// Directory holding the source videos (default: ./original)
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving the extracted audio (default: ./extracted_audio)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory holding the extraction ledgers (default: .)
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default)]
    pub format: AudioFormat,

    /// Target quality, e.g. "192k" (default: 192k)
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Lower the target quality to what the source audio supports
    #[serde(default = "default_true")]
    pub adaptive: bool,

    /// Skip files already recorded or already extracted
    #[serde(default = "default_true")]
    pub resume: bool,

    /// Parallel jobs, 0 = one per CPU
    #[serde(default)]
    pub jobs: usize,

    /// Process one file at a time
    #[serde(default)]
    pub sequential: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./original")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./extracted_audio")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_quality() -> String {
    "192k".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            state_dir: default_state_dir(),
            format: AudioFormat::default(),
            quality: default_quality(),
            adaptive: true,
            resume: true,
            jobs: 0,
            sequential: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
