//! Turning detected silence into padded non-silent segments

use crate::clip::Span;
use regex::Regex;
use std::sync::OnceLock;

/// Silence kept on each side of a non-silent segment.
pub const KEEP_SILENCE_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceParams {
    /// Shortest quiet stretch that counts as silence
    pub min_silence_ms: u64,
    /// Level below which audio is considered silent, in dBFS
    pub thresh_dbfs: f64,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            min_silence_ms: 500,
            thresh_dbfs: -40.0,
        }
    }
}

impl SilenceParams {
    /// Argument for ffmpeg's `silencedetect` filter.
    pub fn filter(&self) -> String {
        format!(
            "silencedetect=noise={}dB:d={}",
            self.thresh_dbfs,
            ms_to_secs(self.min_silence_ms)
        )
    }
}

pub(crate) fn ms_to_secs(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"silence_(start|end):\s*(-?\d+(?:\.\d+)?)").expect("static regex is valid")
    })
}

/// Silent ranges reported by `silencedetect` on stderr. A trailing
/// `silence_start` without an end runs to `duration_ms`.
pub fn parse_silencedetect(stderr: &str, duration_ms: u64) -> Vec<Span> {
    let mut silences = Vec::new();
    let mut open: Option<u64> = None;

    for caps in marker_re().captures_iter(stderr) {
        let Ok(secs) = caps[2].parse::<f64>() else {
            continue;
        };
        let ms = ((secs.max(0.0)) * 1000.0).round() as u64;
        let ms = ms.min(duration_ms);

        match &caps[1] {
            "start" => open = Some(ms),
            _ => {
                if let Some(start) = open.take() {
                    silences.push(Span::new(start, ms));
                }
            }
        }
    }

    if let Some(start) = open {
        silences.push(Span::new(start, duration_ms));
    }
    silences
}

/// Complement of `silences` within `0..duration_ms`.
pub fn nonsilent_ranges(silences: &[Span], duration_ms: u64) -> Vec<Span> {
    let mut ranges = Vec::new();
    let mut cursor = 0u64;

    for silence in silences {
        if silence.start_ms > cursor {
            ranges.push(Span::new(cursor, silence.start_ms));
        }
        cursor = cursor.max(silence.end_ms);
    }
    if cursor < duration_ms {
        ranges.push(Span::new(cursor, duration_ms));
    }
    ranges
}

/// Widen each segment by `keep_ms` on both sides, clamped to the file. Where
/// two widened segments overlap, the overlap is split at its midpoint.
pub fn pad_segments(nonsilent: &[Span], keep_ms: u64, duration_ms: u64) -> Vec<Span> {
    let keep = keep_ms as i64;
    let mut ranges: Vec<(i64, i64)> = nonsilent
        .iter()
        .map(|s| (s.start_ms as i64 - keep, s.end_ms as i64 + keep))
        .collect();

    for i in 1..ranges.len() {
        let last_end = ranges[i - 1].1;
        let next_start = ranges[i].0;
        if next_start < last_end {
            let mid = (last_end + next_start).div_euclid(2);
            ranges[i - 1].1 = mid;
            ranges[i].0 = mid;
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            let start = start.max(0) as u64;
            let end = (end.max(0) as u64).min(duration_ms);
            Span::new(start, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[silencedetect @ 0x600000c3c000] silence_start: -0.00133333
[silencedetect @ 0x600000c3c000] silence_end: 1.2 | silence_duration: 1.20133
size=N/A time=00:00:05.00 bitrate=N/A speed= 450x
[silencedetect @ 0x600000c3c000] silence_start: 3.5
[silencedetect @ 0x600000c3c000] silence_end: 4.25 | silence_duration: 0.75
[silencedetect @ 0x600000c3c000] silence_start: 9.1
";

    #[test]
    fn test_parse_silencedetect() {
        let silences = parse_silencedetect(SAMPLE, 10_000);
        assert_eq!(
            silences,
            vec![Span::new(0, 1_200), Span::new(3_500, 4_250), Span::new(9_100, 10_000)]
        );
    }

    #[test]
    fn test_nonsilent_ranges() {
        let silences = parse_silencedetect(SAMPLE, 10_000);
        assert_eq!(
            nonsilent_ranges(&silences, 10_000),
            vec![Span::new(1_200, 3_500), Span::new(4_250, 9_100)]
        );

        assert_eq!(nonsilent_ranges(&[], 5_000), vec![Span::new(0, 5_000)]);
        assert!(nonsilent_ranges(&[Span::new(0, 5_000)], 5_000).is_empty());
    }

    #[test]
    fn test_pad_segments_clamps_and_splits_overlap() {
        let segments = [Span::new(100, 1_000), Span::new(1_300, 2_000), Span::new(2_900, 2_950)];
        let padded = pad_segments(&segments, KEEP_SILENCE_MS, 3_000);
        assert_eq!(
            padded,
            vec![Span::new(0, 1_150), Span::new(1_150, 2_200), Span::new(2_700, 3_000)]
        );
    }

    #[test]
    fn test_filter_string() {
        let params = SilenceParams {
            min_silence_ms: 1_250,
            thresh_dbfs: -35.5,
        };
        assert_eq!(params.filter(), "silencedetect=noise=-35.5dB:d=1.250");
        assert_eq!(SilenceParams::default().filter(), "silencedetect=noise=-40dB:d=0.500");
    }
}
