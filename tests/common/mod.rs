//! Shared test harness for batch tests.
//!
//! Provides [`FakeExtractor`], which writes placeholder audio files instead of
//! running ffmpeg, and [`Workspace`], a set of temporary directories wired
//! into an [`ExtractionConfig`].

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use audex::config::ExtractionConfig;
use audex::conversion::{BatchScheduler, ExtractSettings, Extractor};
use audex::ledger::{self, Ledger};
use audex::scanner::WorkItem;
use audex_av::{Error, ExtractOutcome};
use audex_common::AudioFormat;
use tempfile::TempDir;

/// Extractor that records its calls and writes a small output file.
#[derive(Default)]
pub struct FakeExtractor {
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make extraction of `key` fail.
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Make extraction of `key` take `delay`.
    pub fn slow(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Extractor for FakeExtractor {
    fn extract(
        &self,
        item: &WorkItem,
        settings: &ExtractSettings,
    ) -> audex_av::Result<ExtractOutcome> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(item.key.clone());

        if let Some(delay) = self.delays.get(&item.key) {
            std::thread::sleep(*delay);
        }

        let result = if self.failing.contains(&item.key) {
            Err(Error::tool_failed("ffmpeg", "exited with 1: Invalid data found"))
        } else {
            let output_path = item
                .output_path(&settings.output_dir, settings.format)
                .unwrap();
            std::fs::write(&output_path, b"audio")
                .map(|()| ExtractOutcome {
                    output_path,
                    quality: settings.quality.clone(),
                })
                .map_err(Error::Io)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Input, output and state directories for one test.
pub struct Workspace {
    root: TempDir,
    pub config: ExtractionConfig,
}

impl Workspace {
    /// Create a workspace whose input directory holds `videos`.
    pub fn with_videos(videos: &[&str]) -> Self {
        let root = tempfile::tempdir().unwrap();
        let input_dir = root.path().join("original");
        std::fs::create_dir(&input_dir).unwrap();
        for name in videos {
            std::fs::write(input_dir.join(name), b"video").unwrap();
        }

        let config = ExtractionConfig {
            input_dir,
            output_dir: root.path().join("extracted_audio"),
            state_dir: root.path().join("state"),
            ..Default::default()
        };

        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn scheduler(&self, extractor: &Arc<FakeExtractor>) -> BatchScheduler {
        let extractor: Arc<dyn Extractor> = extractor.clone();
        BatchScheduler::new(self.config.clone(), extractor)
    }

    pub fn ledger_path(&self) -> PathBuf {
        ledger::ledger_path(&self.config.state_dir, self.config.format)
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::load(self.ledger_path())
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }

    pub fn set_format(&mut self, format: AudioFormat) {
        self.config.format = format;
    }
}

/// A future that never resolves, for runs that must not be interrupted.
pub async fn never() {
    std::future::pending::<()>().await
}
