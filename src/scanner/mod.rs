//! Input discovery.
//!
//! Enumerates the video files of the input directory as [`WorkItem`]s. The
//! scan is not recursive: only the directory's own files are candidates.

use anyhow::{Context, Result};
use audex_common::{paths, paths::is_video_file, AudioFormat};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A source video to extract audio from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Identity key: the file name, including extension.
    pub key: String,
    /// Absolute path to the file.
    pub path: PathBuf,
    pub discovered_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a work item for `path`. Returns `None` for paths without a
    /// file name.
    pub fn new(path: PathBuf) -> Option<Self> {
        let key = path.file_name()?.to_string_lossy().into_owned();
        Some(Self {
            key,
            path,
            discovered_at: Utc::now(),
        })
    }

    /// Where the extracted audio for this item lands.
    pub fn output_path(&self, output_dir: &Path, format: AudioFormat) -> Option<PathBuf> {
        paths::output_path(&self.path, output_dir, format)
    }
}

/// List the video files directly inside `dir`, sorted by key.
///
/// # Errors
///
/// Fails if `dir` does not exist or is not a directory.
pub fn scan_inputs(dir: &Path) -> Result<Vec<WorkItem>> {
    if !dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {:?}", dir);
    }

    let root = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve input directory: {:?}", dir))?;

    info!("Scanning directory: {:?}", root);

    let mut items: Vec<WorkItem> = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let keep = is_video_file(entry.path());
            if !keep {
                debug!("Skipping non-video file: {:?}", entry.path());
            }
            keep
        })
        .filter_map(|entry| WorkItem::new(entry.into_path()))
        .collect();

    items.sort_by(|a, b| a.key.cmp(&b.key));

    info!("Found {} video files in {:?}", items.len(), root);
    for (stem, keys) in stem_collisions(&items) {
        warn!(
            "{} share the output name '{}'; only the last extracted survives",
            keys.join(", "),
            stem
        );
    }
    Ok(items)
}

/// Group items whose file stems match, and so write the same audio file.
/// Only stems shared by two or more items are returned.
pub fn stem_collisions(items: &[WorkItem]) -> BTreeMap<String, Vec<String>> {
    let mut by_stem: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in items {
        if let Some(stem) = item.path.file_stem() {
            by_stem
                .entry(stem.to_string_lossy().into_owned())
                .or_default()
                .push(item.key.clone());
        }
    }
    by_stem.retain(|_, keys| keys.len() > 1);
    by_stem
}
