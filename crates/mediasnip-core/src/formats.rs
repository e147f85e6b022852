//! Video quality options derived from resolved metadata

use crate::error::FormatError;
use crate::media::MediaInfo;
use std::collections::BTreeSet;
use std::fmt;

/// A selectable download quality: what the user sees, and what yt-dlp gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOption {
    pub label: String,
    pub selector: String,
}

impl FormatOption {
    /// Best video+audio pair at exactly `height`, or the best combined stream there.
    pub fn for_height(height: u32) -> Self {
        Self {
            label: format!("{}p", height),
            selector: format!(
                "bestvideo[height={h}]+bestaudio/best[height={h}]",
                h = height
            ),
        }
    }

    pub fn best_available() -> Self {
        Self {
            label: "Best available quality".to_string(),
            selector: "best".to_string(),
        }
    }
}

impl fmt::Display for FormatOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// One option per distinct video height, tallest first. A single video with no
/// height information gets one unconstrained fallback option instead.
pub fn available_video_formats(media: &MediaInfo) -> Vec<FormatOption> {
    let heights: BTreeSet<u32> = media
        .formats()
        .iter()
        .filter(|f| f.has_video())
        .filter_map(|f| f.height)
        .filter(|h| *h > 0)
        .collect();

    let mut options: Vec<FormatOption> = heights
        .into_iter()
        .rev()
        .map(FormatOption::for_height)
        .collect();

    if options.is_empty() && media.is_single_video() {
        options.push(FormatOption::best_available());
    }

    options
}

/// Like [`available_video_formats`], but an empty list for a single item is an error.
/// Collections without height information are left to the caller.
pub fn require_video_formats(media: &MediaInfo) -> Result<Vec<FormatOption>, FormatError> {
    let options = available_video_formats(media);
    if options.is_empty() && !media.is_collection() {
        return Err(FormatError::Unavailable(media.title().to_string()));
    }
    Ok(options)
}

/// Interpret a `--format` argument without metadata: a height ("720" or
/// "720p") maps to [`FormatOption::for_height`], anything else is taken
/// verbatim as a yt-dlp selector.
pub fn format_from_argument(wanted: &str) -> FormatOption {
    let wanted = wanted.trim();
    let digits = wanted
        .strip_suffix('p')
        .or_else(|| wanted.strip_suffix('P'))
        .unwrap_or(wanted);

    match digits.parse::<u32>() {
        Ok(height) if height > 0 && digits.chars().all(|c| c.is_ascii_digit()) => {
            FormatOption::for_height(height)
        }
        _ => FormatOption {
            label: wanted.to_string(),
            selector: wanted.to_string(),
        },
    }
}

/// Match a `--format` argument against the options by label, falling back to
/// [`format_from_argument`].
pub fn pick_format(options: &[FormatOption], wanted: &str) -> FormatOption {
    let fallback = format_from_argument(wanted);
    options
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(&fallback.label))
        .cloned()
        .unwrap_or(fallback)
}
