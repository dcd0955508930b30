//! Encode quality resolution.
//!
//! A requested bitrate is only honoured when the source can back it. When the
//! target exceeds the probed source bitrate, lossy formats snap down to a
//! fixed bucket and other formats pass the source rate through.

use crate::probe::ProbedBitrate;
use audex_common::AudioFormat;

/// Upper bounds (inclusive, bps) of each lossy bucket.
const LOSSY_BUCKETS: [(u64, &str); 4] = [
    (66_000, "64k"),
    (98_000, "96k"),
    (130_000, "128k"),
    (196_000, "192k"),
];

/// Bucket used above the last threshold.
const LOSSY_CEILING: &str = "256k";

/// A target quality: its bitrate plus the string the user wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualitySpec {
    /// Target bits per second.
    pub bps: u64,
    /// Original user-facing form, e.g. `"192k"`.
    pub label: String,
}

impl QualitySpec {
    /// Parse `"192k"`, `"192K"` or a bare `"192"` (kilobits).
    ///
    /// Only the leading digits are read, so `"192kbps"` also parses. Returns
    /// `None` when the string does not start with a digit.
    pub fn parse(label: &str) -> Option<Self> {
        let digits: String = label
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let kbps: u64 = digits.parse().ok()?;

        Some(Self {
            bps: kbps.checked_mul(1000)?,
            label: label.to_string(),
        })
    }
}

/// Pick the quality string to hand to the encoder.
///
/// Returns `target` unchanged when it cannot be parsed, when nothing is
/// known about the source, or when the source already supports it.
///
/// # Example
///
/// ```
/// use audex_av::{resolve_quality, BitrateSource, ProbedBitrate};
/// use audex_common::AudioFormat;
///
/// let source = ProbedBitrate::new(96_000, BitrateSource::Exact);
/// assert_eq!(resolve_quality("192k", Some(&source), AudioFormat::Mp3), "96k");
/// assert_eq!(resolve_quality("64k", Some(&source), AudioFormat::Mp3), "64k");
/// assert_eq!(resolve_quality("192k", None, AudioFormat::Mp3), "192k");
/// ```
pub fn resolve_quality(target: &str, probed: Option<&ProbedBitrate>, format: AudioFormat) -> String {
    let Some(probed) = probed else {
        return target.to_string();
    };

    let Some(spec) = QualitySpec::parse(target) else {
        #[cfg(feature = "tracing")]
        tracing::warn!("Cannot parse target quality '{}', using it as-is", target);
        return target.to_string();
    };

    if spec.bps <= probed.bps {
        return spec.label;
    }

    let adjusted = if format.uses_bitrate() {
        lossy_bucket(probed.bps).to_string()
    } else {
        format!("{}k", probed.kbps())
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Target {} bps exceeds source {} bps, adjusted {} -> {}",
        spec.bps,
        probed.bps,
        spec.label,
        adjusted
    );

    adjusted
}

fn lossy_bucket(source_bps: u64) -> &'static str {
    LOSSY_BUCKETS
        .iter()
        .find(|(limit, _)| source_bps <= *limit)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(LOSSY_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::BitrateSource;

    fn source(bps: u64) -> ProbedBitrate {
        ProbedBitrate::new(bps, BitrateSource::Exact)
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(QualitySpec::parse("192k").unwrap().bps, 192_000);
        assert_eq!(QualitySpec::parse("192K").unwrap().bps, 192_000);
        assert_eq!(QualitySpec::parse("320").unwrap().bps, 320_000);
        assert_eq!(QualitySpec::parse("128kbps").unwrap().bps, 128_000);
        assert_eq!(QualitySpec::parse("192k").unwrap().label, "192k");
        assert!(QualitySpec::parse("high").is_none());
        assert!(QualitySpec::parse("").is_none());
        assert!(QualitySpec::parse("k192").is_none());
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(resolve_quality("192k", Some(&source(66_000)), AudioFormat::Mp3), "64k");
        assert_eq!(resolve_quality("192k", Some(&source(67_000)), AudioFormat::Mp3), "96k");
        assert_eq!(resolve_quality("320k", Some(&source(98_000)), AudioFormat::Aac), "96k");
        assert_eq!(resolve_quality("320k", Some(&source(98_001)), AudioFormat::Aac), "128k");
        assert_eq!(resolve_quality("320k", Some(&source(130_000)), AudioFormat::Mp3), "128k");
        assert_eq!(resolve_quality("320k", Some(&source(196_000)), AudioFormat::Mp3), "192k");
        assert_eq!(resolve_quality("320k", Some(&source(196_001)), AudioFormat::Mp3), "256k");
    }

    #[test]
    fn test_no_upscale_keeps_target_string() {
        let cases = [
            ("64k", 64_000),
            ("128K", 128_000),
            ("128", 300_000),
            ("192k", 1_536_000),
        ];
        for format in [AudioFormat::Mp3, AudioFormat::Aac, AudioFormat::Wav, AudioFormat::Flac] {
            for (target, probed) in cases {
                assert_eq!(
                    resolve_quality(target, Some(&source(probed)), format),
                    target,
                    "{target} vs {probed} for {format}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_source_keeps_target() {
        assert_eq!(resolve_quality("192k", None, AudioFormat::Mp3), "192k");
    }

    #[test]
    fn test_unparseable_target_kept() {
        assert_eq!(resolve_quality("best", Some(&source(64_000)), AudioFormat::Mp3), "best");
    }

    #[test]
    fn test_other_formats_pass_source_rate_through() {
        assert_eq!(resolve_quality("192k", Some(&source(67_500)), AudioFormat::Wav), "67k");
        assert_eq!(resolve_quality("192k", Some(&source(99_999)), AudioFormat::Flac), "99k");
    }
}
