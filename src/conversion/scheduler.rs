//! Batch scheduling.
//!
//! [`BatchScheduler`] scans the input directory, consults the ledger, and
//! runs the pending extractions on a bounded set of blocking workers. The
//! scheduler owns the ledger: workers only report back, and every success is
//! recorded and persisted before the next completion is looked at.

use super::executor::{ExtractSettings, Extractor};
use crate::config::ExtractionConfig;
use crate::ledger::{self, CompletionRecord, Detection, Ledger};
use crate::scanner::{self, WorkItem};
use anyhow::{Context, Result};
use audex_av::ExtractOutcome;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

type JobResult = (WorkItem, audex_av::Result<ExtractOutcome>);

/// Summary of one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Video files found in the input directory.
    pub total_candidates: usize,
    /// Files skipped because the ledger already had them.
    pub previously_completed: usize,
    /// Of those, how many were found on disk during this run.
    pub auto_detected: usize,
    /// Extractions started.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// The run stopped early on a shutdown signal.
    pub interrupted: bool,
    /// Number of workers used.
    pub workers: usize,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn total_completed(&self) -> usize {
        self.previously_completed + self.succeeded
    }

    /// Mean wall time per finished extraction, reported for parallel runs.
    pub fn average_per_file(&self) -> Option<Duration> {
        let finished = self.succeeded + self.failed;
        if self.workers <= 1 || finished == 0 {
            return None;
        }
        u32::try_from(finished).ok().map(|n| self.elapsed / n)
    }
}

/// Number of workers for a run.
///
/// Sequential mode always uses one. Otherwise the requested count (0 meaning
/// one per CPU) is capped by the pending work and the CPU count. Never less
/// than one.
pub fn concurrency_bound(sequential: bool, requested: usize, pending: usize, cpus: usize) -> usize {
    if sequential {
        return 1;
    }
    let requested = if requested == 0 { cpus } else { requested };
    requested.min(pending).min(cpus).max(1)
}

pub struct BatchScheduler {
    config: ExtractionConfig,
    extractor: Arc<dyn Extractor>,
}

impl BatchScheduler {
    pub fn new(config: ExtractionConfig, extractor: Arc<dyn Extractor>) -> Self {
        Self { config, extractor }
    }

    /// Run the batch until it finishes or the process receives Ctrl+C or
    /// SIGTERM.
    pub async fn run(&self) -> Result<BatchReport> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the batch until it finishes or `shutdown` resolves.
    ///
    /// On shutdown no further jobs start, in-flight jobs are abandoned and
    /// the ledger is persisted before returning. Abandoned files stay
    /// pending and are picked up by the next run.
    ///
    /// # Errors
    ///
    /// Fails when the input directory is missing or holds no video files, or
    /// when the output directory cannot be created. Per-file failures are
    /// counted in the report instead.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<BatchReport>
    where
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let cfg = &self.config;

        let items = scanner::scan_inputs(&cfg.input_dir)?;
        if items.is_empty() {
            anyhow::bail!("No video files found in {:?}", cfg.input_dir);
        }

        std::fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", cfg.output_dir))?;

        let mut ledger = self.open_ledger(&items);

        let (completed, pending): (Vec<WorkItem>, Vec<WorkItem>) = items
            .into_iter()
            .partition(|item| ledger.is_completed(&item.key));

        let workers = concurrency_bound(cfg.sequential, cfg.jobs, pending.len(), num_cpus::get());

        let mut report = BatchReport {
            total_candidates: completed.len() + pending.len(),
            previously_completed: completed.len(),
            auto_detected: completed
                .iter()
                .filter(|i| ledger.get(&i.key).is_some_and(|r| r.detected == Detection::Auto))
                .count(),
            workers,
            ..Default::default()
        };

        self.log_plan(&ledger, &completed, &pending, workers);

        if pending.is_empty() {
            info!("All files have already been processed");
            flush(&ledger);
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        let settings = Arc::new(ExtractSettings {
            output_dir: cfg.output_dir.clone(),
            format: cfg.format,
            quality: cfg.quality.clone(),
            adaptive: cfg.adaptive,
        });

        let mut queue = pending.into_iter().enumerate();
        let mut tasks: JoinSet<JobResult> = JoinSet::new();

        for (n, item) in queue.by_ref().take(workers) {
            self.spawn_job(&mut tasks, n + 1, item, Arc::clone(&settings));
            report.attempted += 1;
        }

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    warn!("Shutdown requested, stopping after saving progress");
                    report.interrupted = true;
                    break;
                }

                joined = tasks.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };

                    match joined {
                        Ok((item, Ok(outcome))) => {
                            info!("Completed {} -> {:?}", item.key, outcome.output_path);
                            ledger.record_completion(
                                item.key,
                                CompletionRecord::converted(outcome.output_path, cfg.format, outcome.quality),
                            );
                            flush(&ledger);
                            report.succeeded += 1;
                        }
                        Ok((item, Err(e))) => {
                            error!("Failed to extract {}: {}", item.key, e);
                            report.failed += 1;
                        }
                        Err(e) => {
                            error!("Extraction task panicked or was cancelled: {}", e);
                            report.failed += 1;
                        }
                    }

                    if let Some((n, item)) = queue.next() {
                        self.spawn_job(&mut tasks, n + 1, item, Arc::clone(&settings));
                        report.attempted += 1;
                    }
                }
            }
        }

        if report.interrupted {
            // Blocking jobs cannot be cancelled; detach them and move on.
            tasks.detach_all();
        }

        flush(&ledger);
        report.elapsed = started.elapsed();
        Ok(report)
    }

    fn open_ledger(&self, items: &[WorkItem]) -> Ledger {
        let cfg = &self.config;

        if !cfg.resume {
            info!("Resume disabled, every file will be processed");
            return Ledger::in_memory();
        }

        let mut ledger = Ledger::load(ledger::ledger_path(&cfg.state_dir, cfg.format));
        let detected = ledger::detect_existing_outputs(items, &cfg.output_dir, cfg.format);
        let added = ledger.merge(detected);
        if added > 0 {
            info!("Detected {} existing output files", added);
            flush(&ledger);
        }
        ledger
    }

    fn spawn_job(
        &self,
        tasks: &mut JoinSet<JobResult>,
        n: usize,
        item: WorkItem,
        settings: Arc<ExtractSettings>,
    ) {
        let extractor = Arc::clone(&self.extractor);
        tasks.spawn_blocking(move || {
            let span = tracing::info_span!("job", n, file = %item.key);
            let _enter = span.enter();
            info!("Starting");
            let result = extractor.extract(&item, &settings);
            (item, result)
        });
    }

    fn log_plan(&self, ledger: &Ledger, completed: &[WorkItem], pending: &[WorkItem], workers: usize) {
        let cfg = &self.config;

        if !completed.is_empty() {
            info!("{} files already processed:", completed.len());
            for item in completed {
                let auto = ledger
                    .get(&item.key)
                    .is_some_and(|r| r.detected == Detection::Auto);
                info!("  {}{}", item.key, if auto { " (auto-detected)" } else { "" });
            }
        }

        if !pending.is_empty() {
            info!("{} files to process:", pending.len());
            for item in pending {
                info!("  {}", item.key);
            }
        }

        info!("Output directory: {:?}", cfg.output_dir);
        info!(
            "Format: {}, quality: {}, adaptive: {}",
            cfg.format,
            cfg.quality,
            if cfg.adaptive { "on" } else { "off" }
        );
        match ledger.path() {
            Some(path) => info!("Ledger: {:?}", path),
            None => info!("Ledger: in memory only"),
        }
        if workers > 1 {
            info!("Running {} extractions in parallel", workers);
        } else {
            info!("Running extractions sequentially");
        }
    }
}

/// Persist the ledger, logging instead of failing. A failed write leaves the
/// previous snapshot in place and the run continues.
fn flush(ledger: &Ledger) {
    if let Err(e) = ledger.persist() {
        error!("Failed to save ledger: {:#}", e);
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
