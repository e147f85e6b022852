//! Media info lookup with ordered extractor fallback
//!
//! YouTube URLs are tried against a fixed chain of player clients first. Every
//! URL, YouTube or not, finally gets one attempt with `generic:impersonate`;
//! only the outcome of that last attempt is reported as the terminal error.

use crate::auth::Auth;
use crate::error::ResolveError;
use crate::media::MediaInfo;
use crate::platform::{ExtractorStrategy, Platform};
use crate::process::{push_args, ProcessRunner};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const EXTRACTOR_RETRIES: u32 = 3;
pub const SOCKET_TIMEOUT_SECS: u32 = 10;

/// Resolves a URL into [`MediaInfo`] by shelling out to yt-dlp.
pub struct InfoResolver<R> {
    runner: R,
    yt_dlp_path: PathBuf,
    debug_dump: Option<Mutex<Box<dyn Write + Send>>>,
}

impl<R: ProcessRunner> InfoResolver<R> {
    pub fn new(runner: R, yt_dlp_path: PathBuf) -> Self {
        Self {
            runner,
            yt_dlp_path,
            debug_dump: None,
        }
    }

    /// Print the raw metadata of every successful lookup to stdout.
    pub fn with_debug_dump(self, enabled: bool) -> Self {
        if enabled {
            self.with_debug_writer(std::io::stdout())
        } else {
            Self {
                debug_dump: None,
                ..self
            }
        }
    }

    /// Write the raw metadata of every successful lookup to `writer`.
    pub fn with_debug_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.debug_dump = Some(Mutex::new(Box::new(writer)));
        self
    }

    pub fn debug_dump_enabled(&self) -> bool {
        self.debug_dump.is_some()
    }

    pub async fn resolve(&self, url: &str, auth: &Auth) -> Result<MediaInfo, ResolveError> {
        let platform = Platform::detect(url);
        let chain = ExtractorStrategy::platform_chain(platform);

        for (idx, strategy) in chain.iter().enumerate() {
            info!("Attempting to fetch media info with {} extractor...", strategy);
            match self.attempt(url, auth, *strategy).await {
                Ok(media) => return Ok(media),
                Err(e) => {
                    warn!("Failed with {} extractor: {}", strategy, e);
                    if idx + 1 == chain.len() {
                        info!("All YouTube-specific extractors failed. Falling back to generic extractor...");
                    } else {
                        debug!("Trying next YouTube extractor...");
                    }
                }
            }
        }

        let generic = ExtractorStrategy::GenericImpersonate;
        info!("Attempting to fetch media info with {} extractor...", generic);
        self.attempt(url, auth, generic).await
    }

    /// Arguments for one lookup attempt.
    pub fn lookup_args(url: &str, auth: &Auth, strategy: ExtractorStrategy) -> Vec<OsString> {
        let mut args = Vec::new();
        push_args(
            &mut args,
            [
                "--dump-single-json".to_string(),
                "--flat-playlist".to_string(),
                "--no-warnings".to_string(),
                "--extractor-retries".to_string(),
                EXTRACTOR_RETRIES.to_string(),
                "--socket-timeout".to_string(),
                SOCKET_TIMEOUT_SECS.to_string(),
                url.to_string(),
            ],
        );
        args.extend(auth.lookup_args());
        push_args(&mut args, ["--extractor-args".to_string(), strategy.extractor_arg()]);
        args
    }

    async fn attempt(
        &self,
        url: &str,
        auth: &Auth,
        strategy: ExtractorStrategy,
    ) -> Result<MediaInfo, ResolveError> {
        let args = Self::lookup_args(url, auth, strategy);

        let output = match self.runner.capture(&self.yt_dlp_path, &args).await {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolveError::YtDlpNotFound)
            }
            Err(e) => {
                return Err(ResolveError::Unexpected {
                    strategy: strategy.to_string(),
                    detail: e.to_string(),
                })
            }
        };

        if !output.success() {
            return Err(ResolveError::ProcessFailed {
                strategy: strategy.to_string(),
                code: output.code,
                stderr: output.stderr_lossy().trim().to_string(),
            });
        }

        let value: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| ResolveError::InvalidJson {
                strategy: strategy.to_string(),
                detail: e.to_string(),
            })?;

        let media = MediaInfo::from_json(value);
        debug!("Resolved '{}' ({}) with {}", media.title(), media.media_type(), strategy);

        if let Some(sink) = &self.debug_dump {
            if let Ok(mut out) = sink.lock() {
                // a broken dump target must not fail the lookup
                let _ = writeln!(
                    out,
                    "--- DEBUG: Raw info from yt-dlp (Extractor: {}): {}",
                    strategy,
                    media.pretty()
                );
            }
        }

        Ok(media)
    }
}
