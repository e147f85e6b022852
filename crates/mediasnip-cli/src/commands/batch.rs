use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;

use super::{resolve_auth, truncate};
use crate::args::AuthArgs;
use mediasnip_core::{
    download::{DownloadRequest, Downloader, MediaKind},
    formats::format_from_argument,
    process::{OutputMode, SystemRunner},
    Config, DownloadError,
};

pub struct BatchOptions {
    pub parallel: usize,
    pub audio: bool,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub auth: AuthArgs,
}

pub async fn run(input: &Path, options: &BatchOptions, config: &Config) -> Result<()> {
    if options.parallel == 0 {
        bail!("--parallel must be at least 1");
    }

    let content = fs::read_to_string(input)
        .await
        .context("Failed to read input file")?;
    let urls = parse_url_list(&content);

    if urls.is_empty() {
        println!("No URLs found in input file");
        return Ok(());
    }

    let parallel = options.parallel;
    let total_urls = urls.len();
    println!("Processing {} URLs with {} parallel workers\n", total_urls, parallel);

    let auth = resolve_auth(&options.auth, config)?;
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    let kind = if options.audio {
        MediaKind::Audio
    } else {
        MediaKind::Video
    };

    // Concurrent jobs can't share the terminal with yt-dlp's progress output
    let live = parallel == 1;
    let downloader = Arc::new(Downloader::new(SystemRunner, config.yt_dlp_program()));
    let semaphore = Arc::new(Semaphore::new(parallel));
    let stop = Arc::new(AtomicBool::new(false));
    let continue_on_error = config.batch.continue_on_error;
    let multi = MultiProgress::new();

    let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {msg}")?.tick_chars("=>-");

    let results: Vec<(String, JobOutcome)> = stream::iter(urls.into_iter().enumerate())
        .map(|(idx, url)| {
            let sem = semaphore.clone();
            let stop = stop.clone();
            let downloader = downloader.clone();
            let pb = if live {
                ProgressBar::hidden()
            } else {
                multi.add(ProgressBar::new_spinner())
            };
            pb.set_style(spinner_style.clone());

            let mut request = build_request(&url, &output_dir, kind, options.format.as_deref(), live);
            request.auth = auth.clone();

            async move {
                let _permit = match sem.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return (url, JobOutcome::Skipped),
                };
                if stop.load(Ordering::SeqCst) {
                    pb.finish_and_clear();
                    return (url, JobOutcome::Skipped);
                }

                let label = format!("[{}/{}] {}", idx + 1, total_urls, truncate(&url, 50));
                if live {
                    println!("\n{}", label);
                }
                pb.set_message(label);
                pb.enable_steady_tick(std::time::Duration::from_millis(100));

                let result = downloader.download(&request).await;

                match &result {
                    Ok(files) => {
                        pb.finish_with_message(format!(
                            "[{}/{}] Done: {} file(s)",
                            idx + 1,
                            total_urls,
                            files.len()
                        ));
                    }
                    Err(e) => {
                        if !continue_on_error {
                            stop.store(true, Ordering::SeqCst);
                        }
                        pb.finish_with_message(format!(
                            "[{}/{}] Failed: {}",
                            idx + 1,
                            total_urls,
                            e
                        ));
                    }
                }

                (url, JobOutcome::Finished(result))
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    // Summary
    let succeeded: Vec<_> = results
        .iter()
        .filter(|(_, r)| matches!(r, JobOutcome::Finished(Ok(_))))
        .collect();
    let failed: Vec<_> = results
        .iter()
        .filter(|(_, r)| matches!(r, JobOutcome::Finished(Err(_))))
        .collect();
    let skipped = results
        .iter()
        .filter(|(_, r)| matches!(r, JobOutcome::Skipped))
        .count();

    println!("\n=== Batch Complete ===");
    println!("Succeeded: {}", succeeded.len());
    println!("Failed: {}", failed.len());
    if skipped > 0 {
        println!("Skipped: {}", skipped);
    }

    if !failed.is_empty() {
        println!("\nFailed URLs:");
        for (url, outcome) in &failed {
            if let JobOutcome::Finished(Err(e)) = outcome {
                println!("  {} - {}", url, e);
                for hint in e.remediation() {
                    println!("      {}", hint);
                }
            }
        }
    }

    Ok(())
}

enum JobOutcome {
    Finished(Result<Vec<PathBuf>, DownloadError>),
    /// Not started because an earlier job failed and `continue_on_error` is off
    Skipped,
}

/// `format` goes through the same height rule as the single download command.
fn build_request(
    url: &str,
    output_dir: &Path,
    kind: MediaKind,
    format: Option<&str>,
    live: bool,
) -> DownloadRequest {
    let mut request = DownloadRequest::new(url, output_dir, kind);
    request.format = format.map(|f| format_from_argument(f).selector);
    request.in_batch = true;
    request.output_mode = if live {
        OutputMode::Live
    } else {
        OutputMode::Silent
    };
    request
}

/// One URL per line; blank lines and `#` comments are skipped.
fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list() {
        let content = "\
# music
https://youtu.be/abc

  https://example.com/video
#https://skipped.example
";
        assert_eq!(
            parse_url_list(content),
            vec!["https://youtu.be/abc", "https://example.com/video"]
        );
    }

    #[test]
    fn test_build_request_maps_height() {
        let out = Path::new("/tmp/out");
        let request = build_request("https://youtu.be/abc", out, MediaKind::Video, Some("720"), true);
        assert_eq!(
            request.format.as_deref(),
            Some("bestvideo[height=720]+bestaudio/best[height=720]")
        );
        assert!(request.in_batch);
        assert_eq!(request.output_mode, OutputMode::Live);

        let request = build_request("https://youtu.be/abc", out, MediaKind::Video, Some("worst"), false);
        assert_eq!(request.format.as_deref(), Some("worst"));
        assert_eq!(request.output_mode, OutputMode::Silent);

        let request = build_request("https://youtu.be/abc", out, MediaKind::Audio, None, false);
        assert_eq!(request.format, None);
    }

    #[tokio::test]
    async fn test_zero_parallel_rejected() {
        let options = BatchOptions {
            parallel: 0,
            audio: false,
            format: None,
            output: None,
            auth: AuthArgs::default(),
        };
        let err = run(Path::new("/nonexistent"), &options, &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--parallel"));
    }
}
