//! Error types for mediasnip-core

use thiserror::Error;

/// Terminal failure of the last extractor strategy tried.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Error fetching media info with {strategy} (yt-dlp {}): {stderr}", describe_exit(.code))]
    ProcessFailed {
        strategy: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Error parsing media info from {strategy}: invalid JSON response from yt-dlp ({detail})")]
    InvalidJson { strategy: String, detail: String },

    #[error("yt-dlp not found. Install with: pip install -U yt-dlp (or your package manager)")]
    YtDlpNotFound,

    #[error("An unexpected error occurred with {strategy}: {detail}")]
    Unexpected { strategy: String, detail: String },
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(
        "yt-dlp not found. Install with: pip install -U yt-dlp. \
         ffmpeg is also required for audio extraction and merging video formats"
    )]
    YtDlpNotFound,

    #[error("yt-dlp {}", describe_exit(.code))]
    Failed { code: Option<i32>, used_credentials: bool },

    #[error("Could not read download manifest: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl DownloadError {
    /// Actionable follow-up text shown under the error.
    pub fn remediation(&self) -> Vec<&'static str> {
        match self {
            DownloadError::YtDlpNotFound => vec![
                "Install yt-dlp: pip install -U yt-dlp (or: brew install yt-dlp / pkg install yt-dlp)",
                "Install ffmpeg: brew install ffmpeg (or: apt install ffmpeg / pkg install ffmpeg)",
            ],
            DownloadError::Failed { used_credentials, .. } => {
                let mut hints = vec![
                    "Verify the URL and your internet connection.",
                    "Make sure ffmpeg is installed and up to date.",
                ];
                if *used_credentials {
                    hints.push("Check your login credentials for accuracy.");
                }
                hints
            }
            DownloadError::Manifest(_) | DownloadError::Io(_) => Vec::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("No downloadable video formats found for: {0}")]
    Unavailable(String),
}

/// A single rejected token from a playlist item selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{index} is out of bounds (1-{max}). Please select a valid item.")]
    OutOfBounds { index: i64, max: usize },

    #[error("Range '{range}' is invalid or out of bounds (1-{max}).")]
    RangeOutOfBounds { range: String, max: usize },

    #[error("Invalid range format '{0}'. Please use a format like '1-5'.")]
    MalformedRange(String),

    #[error("'{0}' is not a valid item number. Please enter a number or range.")]
    MalformedNumber(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_display() {
        let failed = DownloadError::Failed {
            code: Some(1),
            used_credentials: false,
        };
        assert_eq!(failed.to_string(), "yt-dlp exited with code 1");

        let killed = DownloadError::Failed {
            code: None,
            used_credentials: false,
        };
        assert_eq!(killed.to_string(), "yt-dlp was terminated by a signal");

        let resolve = ResolveError::ProcessFailed {
            strategy: "generic".to_string(),
            code: Some(2),
            stderr: "boom".to_string(),
        };
        assert_eq!(
            resolve.to_string(),
            "Error fetching media info with generic (yt-dlp exited with code 2): boom"
        );
    }
}
