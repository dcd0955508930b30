//! Completion ledger.
//!
//! The ledger maps each input's identity key to its [`CompletionRecord`]. It
//! lives in memory for the duration of a run and is written out as a whole
//! JSON document after every change. One ledger exists per output format.

mod types;

pub use types::*;

use crate::scanner::WorkItem;
use anyhow::{Context, Result};
use audex_common::AudioFormat;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Location of the ledger for `format` inside `state_dir`.
pub fn ledger_path(state_dir: &Path, format: AudioFormat) -> PathBuf {
    state_dir.join(format!("extraction_record_{}.json", format))
}

#[derive(Debug, Default)]
pub struct Ledger {
    path: Option<PathBuf>,
    records: BTreeMap<String, CompletionRecord>,
    /// Entries that could not be read as a [`CompletionRecord`]. They are
    /// written back unchanged and never count as completed.
    unreadable: BTreeMap<String, serde_json::Value>,
}

impl Ledger {
    /// Load the ledger stored at `path`.
    ///
    /// A missing file, or one that is not a JSON object, yields an empty
    /// ledger that will still be written to `path`. Individual entries that
    /// do not parse are kept aside and preserved on the next write.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring unreadable ledger {:?}: {:#}", path, e);
                BTreeMap::new()
            }
        };

        let mut records = BTreeMap::new();
        let mut unreadable = BTreeMap::new();
        for (key, value) in entries {
            match serde_json::from_value::<CompletionRecord>(value.clone()) {
                Ok(record) => {
                    records.insert(key, record);
                }
                Err(e) => {
                    tracing::warn!("Keeping unreadable ledger entry {} as-is: {}", key, e);
                    unreadable.insert(key, value);
                }
            }
        }

        tracing::debug!(
            "Loaded {} ledger records ({} unreadable) from {:?}",
            records.len(),
            unreadable.len(),
            path
        );

        Self {
            path: Some(path),
            records,
            unreadable,
        }
    }

    /// A ledger that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, serde_json::Value>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger: {:?}", path))?;
        let entries = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse ledger: {:?}", path))?;
        Ok(entries)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&CompletionRecord> {
        self.records.get(key)
    }

    pub fn is_completed(&self, key: &str) -> bool {
        self.records.get(key).is_some_and(CompletionRecord::is_completed)
    }

    pub fn records(&self) -> impl Iterator<Item = (&str, &CompletionRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries, readable or not.
    pub fn len(&self) -> usize {
        self.records.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.unreadable.is_empty()
    }

    /// Keys of the entries that could not be read.
    pub fn unreadable_keys(&self) -> impl Iterator<Item = &str> {
        self.unreadable.keys().map(String::as_str)
    }

    pub fn completed_count(&self) -> usize {
        self.records.values().filter(|r| r.is_completed()).count()
    }

    /// Add auto-detected records for keys the ledger does not know yet.
    ///
    /// Existing records always win; an unreadable entry is replaced.
    /// Returns how many records were added.
    pub fn merge(&mut self, detected: BTreeMap<String, CompletionRecord>) -> usize {
        let mut added = 0;
        for (key, record) in detected {
            if !self.records.contains_key(&key) {
                self.unreadable.remove(&key);
                self.records.insert(key, record);
                added += 1;
            }
        }
        added
    }

    /// Store a completion for `key`, replacing any previous record.
    ///
    /// Only completed records are meant to be passed here; nothing in a run
    /// moves a key back to pending.
    pub fn record_completion(&mut self, key: impl Into<String>, record: CompletionRecord) {
        let key = key.into();
        self.unreadable.remove(&key);
        self.records.insert(key, record);
    }

    /// Write the whole ledger to its file.
    ///
    /// The snapshot is written to a temporary file next to the ledger and
    /// renamed over it, so a crash mid-write leaves the previous snapshot.
    /// In-memory ledgers are not written.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create ledger directory: {:?}", dir))?;

        let mut document = self.unreadable.clone();
        for (key, record) in &self.records {
            document.insert(key.clone(), serde_json::to_value(record)?);
        }
        let mut json = serde_json::to_string_pretty(&document)?;
        json.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary ledger in {:?}", dir))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write ledger: {:?}", path))?;

        tracing::trace!("Persisted {} ledger entries to {:?}", document.len(), path);
        Ok(())
    }
}

/// Find items whose output already exists and is non-empty.
///
/// Returns an auto-detected completion record per such item, timestamped with
/// the output file's modification time.
pub fn detect_existing_outputs(
    items: &[WorkItem],
    output_dir: &Path,
    format: AudioFormat,
) -> BTreeMap<String, CompletionRecord> {
    let mut detected = BTreeMap::new();

    for item in items {
        let Some(output) = item.output_path(output_dir, format) else {
            continue;
        };
        let Ok(metadata) = std::fs::metadata(&output) else {
            continue;
        };
        if !metadata.is_file() || metadata.len() == 0 {
            continue;
        }

        let timestamp = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        tracing::debug!("Found existing output for {}: {:?}", item.key, output);
        detected.insert(
            item.key.clone(),
            CompletionRecord::auto_detected(output, format, timestamp),
        );
    }

    detected
}
