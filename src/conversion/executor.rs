//! Per-file extraction.

use crate::scanner::WorkItem;
use audex_av::{extract_audio, probe_audio_bitrate, resolve_quality, ExtractOutcome, ToolPaths};
use audex_common::AudioFormat;
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings shared by every job of a batch.
#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub output_dir: PathBuf,
    pub format: AudioFormat,
    /// Target quality, e.g. "192k".
    pub quality: String,
    /// Lower the target to what the source audio carries.
    pub adaptive: bool,
}

/// Something that turns one [`WorkItem`] into an audio file.
///
/// Implementations are called from blocking worker threads and must be
/// safe to share between them.
pub trait Extractor: Send + Sync {
    fn extract(&self, item: &WorkItem, settings: &ExtractSettings)
        -> audex_av::Result<ExtractOutcome>;
}

/// Extractor backed by the `ffprobe` and `ffmpeg` executables.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    tools: ToolPaths,
}

impl FfmpegExtractor {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// Choose the quality for `item`.
    ///
    /// Without adaptive mode this is the configured target. With it, the
    /// source is probed first and a failed probe keeps the target.
    fn quality_for(&self, item: &WorkItem, settings: &ExtractSettings) -> String {
        if !settings.adaptive {
            return settings.quality.clone();
        }

        info!("Analyzing audio bitrate");
        let probed = probe_audio_bitrate(&self.tools.ffprobe, &item.path);
        match &probed {
            Some(p) => info!("Source audio bitrate: {}", p),
            None => debug!("Source bitrate unknown, keeping {}", settings.quality),
        }

        let resolved = resolve_quality(&settings.quality, probed.as_ref(), settings.format);
        if resolved != settings.quality {
            info!("Adjusted quality {} -> {}", settings.quality, resolved);
        }
        resolved
    }
}

impl Extractor for FfmpegExtractor {
    fn extract(
        &self,
        item: &WorkItem,
        settings: &ExtractSettings,
    ) -> audex_av::Result<ExtractOutcome> {
        let quality = self.quality_for(item, settings);
        info!("Extracting audio ({}, {})", settings.format, quality);
        extract_audio(
            &self.tools.ffmpeg,
            &item.path,
            &settings.output_dir,
            settings.format,
            &quality,
        )
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn fixture(adaptive: bool) -> (tempfile::TempDir, FfmpegExtractor, WorkItem, ExtractSettings) {
        let dir = tempfile::tempdir().unwrap();
        let ffprobe = script(
            dir.path(),
            "ffprobe",
            r#"echo '{"streams": [{"codec_type": "audio", "bit_rate": "96000"}]}'"#,
        );
        let ffmpeg = script(dir.path(), "ffmpeg", "for last; do :; done\nprintf 'audio' > \"$last\"");

        let input = dir.path().join("talk.mkv");
        std::fs::write(&input, b"x").unwrap();
        let output_dir = dir.path().join("out");
        std::fs::create_dir(&output_dir).unwrap();

        let extractor = FfmpegExtractor::new(ToolPaths { ffmpeg, ffprobe });
        let settings = ExtractSettings {
            output_dir,
            format: AudioFormat::Mp3,
            quality: "192k".to_string(),
            adaptive,
        };
        (dir, extractor, WorkItem::new(input).unwrap(), settings)
    }

    #[test]
    fn test_adaptive_quality_follows_source() {
        let (_dir, extractor, item, settings) = fixture(true);
        let outcome = extractor.extract(&item, &settings).unwrap();
        assert_eq!(outcome.quality, "96k");
        assert_eq!(outcome.output_path, settings.output_dir.join("talk.mp3"));
    }

    #[test]
    fn test_fixed_quality_skips_probe() {
        let (_dir, extractor, item, settings) = fixture(false);
        let outcome = extractor.extract(&item, &settings).unwrap();
        assert_eq!(outcome.quality, "192k");
    }
}
