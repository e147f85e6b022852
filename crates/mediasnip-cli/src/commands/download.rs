use anyhow::Result;

use super::{info::fetch, prompt, resolve_auth};
use crate::args::DownloadOptions;
use mediasnip_core::{
    download::{DownloadRequest, Downloader, MediaKind},
    formats::{available_video_formats, pick_format, require_video_formats, FormatOption},
    media::MediaInfo,
    process::SystemRunner,
    selection::{parse_selection, UNKNOWN_COUNT_LIMIT},
    Config, DownloadError,
};

pub async fn run(url: &str, options: &DownloadOptions, config: &Config) -> Result<()> {
    let auth = resolve_auth(&options.auth, config)?;
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    let kind = if options.audio {
        MediaKind::Audio
    } else if options.format.is_some() {
        MediaKind::Video
    } else {
        parse_kind(&prompt::ask_or("Download (v)ideo or (a)udio only?", "v")?)
    };

    let info = fetch(url, &auth, config).await?;
    println!("Title: {}", info.title());

    let mut request = DownloadRequest::new(url, &output_dir, kind);
    request.auth = auth;

    if info.is_collection() {
        let Some(items) = choose_items(&info, options.items.as_deref())? else {
            println!("No valid items selected. Nothing to download.");
            return Ok(());
        };
        request.playlist_items = items;
    }

    if kind == MediaKind::Video {
        let Some(format) = choose_format(&info, options.format.as_deref())? else {
            println!("Download cancelled.");
            return Ok(());
        };
        println!("Format: {}", format.label);
        request.format = Some(format.selector);
    }

    let downloader = Downloader::new(SystemRunner, config.yt_dlp_program());
    match downloader.download(&request).await {
        Ok(files) => {
            println!("\nDownload of {} completed successfully!", kind);
            if files.is_empty() {
                println!("yt-dlp did not report any output files");
            }
            for file in &files {
                println!("Saved: {}", file.display());
            }
            if kind == MediaKind::Audio && !files.is_empty() {
                println!("\nSplit with: mediasnip split <FILE>");
            }
            Ok(())
        }
        Err(e) => Err(download_failure(kind, e)),
    }
}

/// The error reported by `main`, with remediation hints in the context line.
pub(crate) fn download_failure(kind: MediaKind, e: DownloadError) -> anyhow::Error {
    let mut message = format!("{} download failed", kind);
    for hint in e.remediation() {
        message.push_str("\n  ");
        message.push_str(hint);
    }
    anyhow::Error::new(e).context(message)
}

/// `Some(None)` means every item, `None` means nothing valid was selected.
fn choose_items(info: &MediaInfo, items: Option<&str>) -> Result<Option<Option<String>>> {
    let count = info.entry_count();
    match count {
        Some(n) => println!("Playlist with {} items", n),
        None => println!("Playlist (item count unknown)"),
    }

    let answer = match items {
        Some(s) => s.to_string(),
        None => prompt::ask_or("Items to download (e.g. 1,3,5 or 2-4, or 'all')", "all")?,
    };

    let selection = parse_selection(&answer, count.unwrap_or(UNKNOWN_COUNT_LIMIT));
    for problem in &selection.problems {
        eprintln!("Error: {}", problem);
    }
    if selection.items.is_empty() {
        return Ok(None);
    }
    Ok(Some(selection.items.playlist_items()))
}

/// `None` when the user cancels the menu.
fn choose_format(info: &MediaInfo, wanted: Option<&str>) -> Result<Option<FormatOption>> {
    let options = if info.is_collection() {
        // flat playlist entries carry no formats
        let options = available_video_formats(info);
        if options.is_empty() {
            vec![FormatOption::best_available()]
        } else {
            options
        }
    } else {
        require_video_formats(info)?
    };

    if let Some(wanted) = wanted {
        return Ok(Some(pick_format(&options, wanted)));
    }
    if options.len() == 1 {
        return Ok(options.into_iter().next());
    }

    Ok(prompt::choose("Available video formats:", &options)?.map(|i| options[i].clone()))
}

fn parse_kind(answer: &str) -> MediaKind {
    if answer.trim().to_lowercase().starts_with('a') {
        MediaKind::Audio
    } else {
        MediaKind::Video
    }
}
