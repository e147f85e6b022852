//! Download orchestration on top of yt-dlp

use crate::auth::Auth;
use crate::error::DownloadError;
use crate::platform::Platform;
use crate::process::{push_args, OutputMode, ProcessRunner};
use crate::resolver::{EXTRACTOR_RETRIES, SOCKET_TIMEOUT_SECS};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const FRAGMENT_RETRIES: u32 = 10;
/// Seconds yt-dlp waits between items when several are requested.
pub const MULTI_ITEM_SLEEP_SECS: u32 = 5;
/// Transfer cap applied when several items are requested.
pub const MULTI_ITEM_RATE_LIMIT: &str = "500K";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    /// yt-dlp `-f` selector; ignored for audio
    pub format: Option<String>,
    pub output_dir: PathBuf,
    pub kind: MediaKind,
    /// Value for `--playlist-items`
    pub playlist_items: Option<String>,
    pub auth: Auth,
    /// Part of a multi-URL batch; gets the same throttle as playlist selections
    pub in_batch: bool,
    pub output_mode: OutputMode,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, output_dir: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            url: url.into(),
            format: None,
            output_dir: output_dir.into(),
            kind,
            playlist_items: None,
            auth: Auth::none(),
            in_batch: false,
            output_mode: OutputMode::Live,
        }
    }

    /// Multiple items go out with a fixed delay and rate cap.
    pub fn is_throttled(&self) -> bool {
        self.playlist_items.is_some() || self.in_batch
    }

    pub fn output_template(&self) -> PathBuf {
        match self.kind {
            MediaKind::Video => self.output_dir.join("%(title)s.%(ext)s"),
            MediaKind::Audio => self.output_dir.join("%(title)s.mp3"),
        }
    }

    /// Full yt-dlp argument list. `manifest` receives one final file path per line.
    pub fn to_args(&self, manifest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        match self.kind {
            MediaKind::Video => {
                let selector = self.format.as_deref().unwrap_or("best");
                push_args(&mut args, ["-f", selector]);
            }
            MediaKind::Audio => {
                push_args(&mut args, ["-x", "--audio-format", "mp3", "--audio-quality", "0"]);
            }
        }

        args.extend(self.auth.download_args());

        if let Some(ref items) = self.playlist_items {
            push_args(&mut args, ["--playlist-items", items.as_str()]);
        }
        if self.is_throttled() {
            push_args(
                &mut args,
                [
                    "--sleep-interval".to_string(),
                    MULTI_ITEM_SLEEP_SECS.to_string(),
                    "--limit-rate".to_string(),
                    MULTI_ITEM_RATE_LIMIT.to_string(),
                ],
            );
        }

        push_args(&mut args, ["-o"]);
        args.push(self.output_template().into_os_string());

        push_args(
            &mut args,
            [
                "--progress".to_string(),
                "--extractor-retries".to_string(),
                EXTRACTOR_RETRIES.to_string(),
                "--socket-timeout".to_string(),
                SOCKET_TIMEOUT_SECS.to_string(),
                "--fragment-retries".to_string(),
                FRAGMENT_RETRIES.to_string(),
                "--print-to-file".to_string(),
                "after_move:filepath".to_string(),
            ],
        );
        args.push(manifest.as_os_str().to_owned());
        push_args(&mut args, [self.url.as_str()]);

        let strategy = Platform::detect(&self.url).download_strategy();
        push_args(&mut args, ["--extractor-args".to_string(), strategy.extractor_arg()]);

        args
    }
}

pub struct Downloader<R> {
    runner: R,
    yt_dlp_path: PathBuf,
}

impl<R: ProcessRunner> Downloader<R> {
    pub fn new(runner: R, yt_dlp_path: PathBuf) -> Self {
        Self { runner, yt_dlp_path }
    }

    /// Run the download and return the files yt-dlp reports having written.
    pub async fn download(&self, request: &DownloadRequest) -> Result<Vec<PathBuf>, DownloadError> {
        tokio::fs::create_dir_all(&request.output_dir).await?;

        let manifest = tempfile::Builder::new()
            .prefix("mediasnip-manifest-")
            .suffix(".txt")
            .tempfile()?;
        let args = request.to_args(manifest.path());

        info!("Starting {} download from: {}", request.kind, request.url);
        if let Some(ref items) = request.playlist_items {
            info!("Selected playlist items: {}", items);
        }
        if request.is_throttled() {
            info!(
                "Multiple items requested: adding a {}s delay between items and limiting the rate to {}B/s",
                MULTI_ITEM_SLEEP_SECS, MULTI_ITEM_RATE_LIMIT
            );
        }
        info!("Saving to: {}", request.output_dir.display());

        let code = match self
            .runner
            .run(&self.yt_dlp_path, &args, request.output_mode)
            .await
        {
            Ok(code) => code,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DownloadError::YtDlpNotFound)
            }
            Err(e) => return Err(DownloadError::Io(e)),
        };

        if code != Some(0) {
            warn!("yt-dlp exited with {:?}", code);
            return Err(DownloadError::Failed {
                code,
                used_credentials: request.auth.has_login(),
            });
        }

        let files = read_manifest(manifest.path()).await?;
        debug!("yt-dlp reported {} file(s)", files.len());
        Ok(files)
    }
}

/// Existing, deduplicated paths from a `--print-to-file` manifest, in order.
async fn read_manifest(path: &Path) -> Result<Vec<PathBuf>, DownloadError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DownloadError::Manifest(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let candidate = PathBuf::from(line);
        if !candidate.exists() {
            debug!("Reported file no longer exists: {}", candidate.display());
            continue;
        }
        if seen.insert(candidate.clone()) {
            files.push(candidate);
        }
    }
    Ok(files)
}
