//! Site detection and the extractor strategies yt-dlp is asked to emulate

use std::fmt;

/// Sites that get special extractor handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    Other,
}

impl Platform {
    pub fn detect(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Platform::YouTube
        } else {
            Platform::Other
        }
    }

    /// Extractor argument used for actual downloads.
    pub fn download_strategy(self) -> ExtractorStrategy {
        match self {
            Platform::YouTube => ExtractorStrategy::YouTubeClient(PlayerClient::Android),
            Platform::Other => ExtractorStrategy::GenericImpersonate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClient {
    Android,
    Web,
    WebPublic,
    Ios,
}

impl PlayerClient {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClient::Android => "android",
            PlayerClient::Web => "web",
            PlayerClient::WebPublic => "web_public",
            PlayerClient::Ios => "ios",
        }
    }
}

/// A named `--extractor-args` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorStrategy {
    YouTubeDefault,
    YouTubeClient(PlayerClient),
    GenericImpersonate,
}

impl ExtractorStrategy {
    pub fn extractor_arg(self) -> String {
        match self {
            ExtractorStrategy::YouTubeDefault => "youtube".to_string(),
            ExtractorStrategy::YouTubeClient(client) => {
                format!("youtube:player_client={}", client.as_str())
            }
            ExtractorStrategy::GenericImpersonate => "generic:impersonate".to_string(),
        }
    }

    /// Platform-specific strategies in the order they are tried. The generic
    /// fallback is never part of this list.
    pub fn platform_chain(platform: Platform) -> &'static [ExtractorStrategy] {
        const YOUTUBE: &[ExtractorStrategy] = &[
            ExtractorStrategy::YouTubeDefault,
            ExtractorStrategy::YouTubeClient(PlayerClient::Android),
            ExtractorStrategy::YouTubeClient(PlayerClient::Web),
            ExtractorStrategy::YouTubeClient(PlayerClient::WebPublic),
            ExtractorStrategy::YouTubeClient(PlayerClient::Ios),
        ];

        match platform {
            Platform::YouTube => YOUTUBE,
            Platform::Other => &[],
        }
    }
}

impl fmt::Display for ExtractorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extractor_arg())
    }
}
