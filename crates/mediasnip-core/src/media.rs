//! Metadata returned by `yt-dlp --dump-single-json`

use serde_json::Value;

/// Opaque metadata document with typed accessors for the keys we read.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    raw: Value,
}

/// The subset of a yt-dlp format entry used for quality selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    pub vcodec: Option<String>,
    pub height: Option<u32>,
}

impl FormatEntry {
    /// A format carries video unless yt-dlp explicitly says `vcodec: none`.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }
}

impl MediaInfo {
    pub fn from_json(raw: Value) -> Self {
        Self { raw }
    }

    pub fn title(&self) -> &str {
        self.raw["title"].as_str().unwrap_or("Unknown")
    }

    /// `_type` as reported by yt-dlp ("video", "playlist", ...). Single videos
    /// dumped with `--dump-single-json` may omit it.
    pub fn media_type(&self) -> &str {
        self.raw["_type"].as_str().unwrap_or("video")
    }

    pub fn is_single_video(&self) -> bool {
        self.media_type() == "video"
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.media_type(), "playlist" | "multi_video")
    }

    /// Number of entries in a playlist, when known.
    pub fn entry_count(&self) -> Option<usize> {
        if let Some(n) = self.raw["playlist_count"].as_u64() {
            return Some(n as usize);
        }
        self.raw["entries"].as_array().map(|e| e.len())
    }

    pub fn formats(&self) -> Vec<FormatEntry> {
        let Some(formats) = self.raw["formats"].as_array() else {
            return Vec::new();
        };

        formats
            .iter()
            .map(|f| FormatEntry {
                vcodec: f["vcodec"].as_str().map(str::to_string),
                height: f["height"].as_u64().and_then(|h| u32::try_from(h).ok()),
            })
            .collect()
    }

    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}
