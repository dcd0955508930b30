mod cli;

use audex::{
    config::{self, Config},
    conversion::{BatchReport, BatchScheduler, FfmpegExtractor},
    ledger::{self, Detection, Ledger},
};
use audex_av::{probe_audio_bitrate, resolve_quality, ToolPaths};
use audex_common::AudioFormat;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit status after a run stopped by Ctrl+C or SIGTERM.
const EXIT_INTERRUPTED: i32 = 130;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "audex=debug,audex_av=debug".to_string()
        } else {
            "audex=info,audex_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Run(args) => run_batch(args, cli.config.as_deref()),
        Commands::Probe {
            file,
            quality,
            format,
        } => probe_file(&file, &quality, format, cli.config.as_deref()),
        Commands::Status { format, state_dir } => {
            show_status(format, state_dir, cli.config.as_deref())
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

/// Apply command line overrides on top of the loaded config.
fn apply_run_args(config: &mut Config, args: RunArgs) {
    let extraction = &mut config.extraction;

    if let Some(dir) = args.input_dir {
        extraction.input_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        extraction.output_dir = dir;
    }
    if let Some(dir) = args.state_dir {
        extraction.state_dir = dir;
    }
    if let Some(format) = args.format {
        extraction.format = format;
    }
    if let Some(quality) = args.quality {
        extraction.quality = quality;
    }
    if let Some(jobs) = args.jobs {
        extraction.jobs = jobs;
    }
    if args.adaptive {
        extraction.adaptive = true;
    }
    if args.no_adaptive {
        extraction.adaptive = false;
    }
    if args.no_resume {
        extraction.resume = false;
    }
    if args.sequential {
        extraction.sequential = true;
    }
}

fn discover_tools(config: &Config) -> Result<ToolPaths> {
    ToolPaths::discover(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    )
    .context("ffmpeg and ffprobe are required; install FFmpeg or set [tools] paths in the config")
}

fn run_batch(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    apply_run_args(&mut config, args);
    config::validate_config(&config)?;

    let tools = discover_tools(&config)?;
    tracing::info!("Using ffmpeg at {:?}", tools.ffmpeg);
    tracing::debug!("Using ffprobe at {:?}", tools.ffprobe);

    let scheduler = BatchScheduler::new(config.extraction, Arc::new(FfmpegExtractor::new(tools)));

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(scheduler.run());
    // Abandoned ffmpeg jobs must not hold up exit.
    rt.shutdown_background();

    let report = result?;
    print_report(&report);

    if report.interrupted {
        std::process::exit(EXIT_INTERRUPTED);
    }
    Ok(())
}

fn print_report(report: &BatchReport) {
    println!();
    if report.interrupted {
        println!("Interrupted. Progress has been saved; run again to resume.");
    } else {
        println!("Batch complete.");
    }
    println!("  Videos found:        {}", report.total_candidates);
    println!(
        "  Already processed:   {} ({} auto-detected)",
        report.previously_completed, report.auto_detected
    );
    println!("  Extracted this run:  {}/{}", report.succeeded, report.attempted);
    if report.failed > 0 {
        println!("  Failed:              {}", report.failed);
    }
    println!(
        "  Total completed:     {}/{}",
        report.total_completed(),
        report.total_candidates
    );
    println!("  Elapsed:             {:.1}s", report.elapsed.as_secs_f64());
    if let Some(avg) = report.average_per_file() {
        println!(
            "  Average per file:    {:.1}s ({} workers)",
            avg.as_secs_f64(),
            report.workers
        );
    }
}

fn probe_file(
    file: &Path,
    quality: &str,
    format: AudioFormat,
    config_path: Option<&Path>,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let tools = discover_tools(&config)?;

    let probed = probe_audio_bitrate(&tools.ffprobe, file);
    let resolved = resolve_quality(quality, probed.as_ref(), format);

    println!("File: {}", file.display());
    match probed {
        Some(p) => println!("Audio bitrate: {}", p),
        None => println!("Audio bitrate: unknown"),
    }
    println!("Quality for {} at target {}: {}", format, quality, resolved);

    Ok(())
}

fn show_status(
    format: Option<AudioFormat>,
    state_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let format = format.unwrap_or(config.extraction.format);
    let state_dir = state_dir.unwrap_or(config.extraction.state_dir);

    let path = ledger::ledger_path(&state_dir, format);
    if !path.exists() {
        println!("No ledger for {} at {}", format, path.display());
        return Ok(());
    }

    let ledger = Ledger::load(&path);
    println!("Ledger: {}", path.display());
    println!(
        "Completed: {} of {} records\n",
        ledger.completed_count(),
        ledger.len()
    );

    for (key, record) in ledger.records() {
        let mark = if record.is_completed() { "✓" } else { " " };
        print!("{} {} -> {}", mark, key, record.output_file.display());
        if let Some(ref quality) = record.quality {
            print!(" [{}]", quality);
        }
        if record.detected == Detection::Auto {
            print!(" (auto-detected)");
        }
        println!(" {}", record.timestamp.to_rfc3339());
    }
    for key in ledger.unreadable_keys() {
        println!("? {} (unreadable entry, kept as-is)", key);
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = audex_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install FFmpeg to extract audio.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let extraction = &config.extraction;
    println!("  Input directory:  {}", extraction.input_dir.display());
    println!("  Output directory: {}", extraction.output_dir.display());
    println!("  State directory:  {}", extraction.state_dir.display());
    println!("  Format: {}, quality: {}", extraction.format, extraction.quality);
    println!("  Adaptive: {}", extraction.adaptive);
    println!("  Resume: {}", extraction.resume);
    if extraction.sequential {
        println!("  Jobs: 1 (sequential)");
    } else if extraction.jobs == 0 {
        println!("  Jobs: auto ({} CPUs)", num_cpus::get());
    } else {
        println!("  Jobs: {}", extraction.jobs);
    }

    Ok(())
}
