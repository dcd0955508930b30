use audex_common::AudioFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "audex")]
#[command(author, version, about = "Resumable batch audio extraction from video files")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract audio from every video in the input directory
    Run(RunArgs),

    /// Show the audio bitrate of a file and the quality it would get
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Target quality to resolve against the source
        #[arg(short, long, default_value = "192k")]
        quality: String,

        /// Output format (mp3, aac, wav, flac)
        #[arg(short, long, default_value = "mp3")]
        format: AudioFormat,
    },

    /// Show the ledger for a format
    Status {
        /// Output format (mp3, aac, wav, flac)
        #[arg(short, long)]
        format: Option<AudioFormat>,

        /// Directory holding the ledgers
        #[arg(long)]
        state_dir: Option<PathBuf>,
    },

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}

/// Overrides for the `[extraction]` config section.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Directory containing the source videos
    #[arg(short = 'd', long = "directory")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the extracted audio
    #[arg(short, long = "output")]
    pub output_dir: Option<PathBuf>,

    /// Output format (mp3, aac, wav, flac)
    #[arg(short, long)]
    pub format: Option<AudioFormat>,

    /// Target quality, e.g. 192k
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Lower the target to the source bitrate (default unless the config disables it)
    #[arg(long)]
    pub adaptive: bool,

    /// Always use the target quality, even above the source bitrate
    #[arg(long, conflicts_with = "adaptive")]
    pub no_adaptive: bool,

    /// Ignore the ledger and existing outputs; process every file
    #[arg(long)]
    pub no_resume: bool,

    /// Number of parallel jobs, 0 = one per CPU
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Process one file at a time
    #[arg(long)]
    pub sequential: bool,

    /// Directory holding the ledgers
    #[arg(long)]
    pub state_dir: Option<PathBuf>,
}
