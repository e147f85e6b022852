use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::prompt;
use crate::args::{SplitMode, SplitOptions};
use mediasnip_core::Config;
use mediasnip_split::{FfmpegBackend, SilenceParams, SplitEvent, SplitJob, SplitStrategy, Splitter};

const MODES: [SplitMode; 3] = [SplitMode::Chunk, SplitMode::Silence, SplitMode::SilenceChunk];

pub async fn run(file: Option<&Path>, options: &SplitOptions, config: &Config) -> Result<()> {
    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    let input = match file {
        Some(path) => path.to_path_buf(),
        None => {
            let files = list_mp3_files(&output_dir).await?;
            if files.is_empty() {
                println!("No MP3 files found in {}", output_dir.display());
                return Ok(());
            }
            let names: Vec<String> = files
                .iter()
                .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
                .collect();
            match prompt::choose("Available MP3 files:", &names)? {
                Some(i) => files[i].clone(),
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    if !input.is_file() {
        bail!("Audio file not found: {}", input.display());
    }

    // Parameters are only asked for when the mode was chosen interactively
    let (mode, interactive) = match options.mode {
        Some(mode) => (mode, false),
        None => match prompt::choose("Splitting method:", &MODES)? {
            Some(i) => (MODES[i], true),
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        },
    };

    let strategy = build_strategy(mode, options, config, interactive)?;
    let job = SplitJob {
        input,
        output_dir,
        strategy,
    };

    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    let bar_style =
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-");

    let progress_handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SplitEvent::Analyzing => pb.set_message("Analyzing audio..."),
                SplitEvent::Exporting { total } => {
                    pb.set_style(bar_style.clone());
                    pb.set_length(total as u64);
                    pb.set_message("Exporting chunks...");
                }
                SplitEvent::ChunkSaved { index, total, path } => {
                    pb.set_position(index as u64);
                    pb.set_message(
                        path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .into_owned(),
                    );
                    if index == total {
                        pb.finish_and_clear();
                    }
                }
            }
        }
        pb.finish_and_clear();
    });

    let splitter = Splitter::new(FfmpegBackend::new(
        config.ffmpeg_program(),
        config.ffprobe_program(),
    ))
    .with_progress(tx);
    let result = splitter.split(&job).await;
    drop(splitter);

    // Wait for progress handler
    progress_handle.await?;

    let report = result?;
    for chunk in &report.chunks {
        println!("Saved chunk: {}", chunk.display());
    }
    println!(
        "\nAudio successfully split into {} chunks in: {}",
        report.chunks.len(),
        report.chunk_dir.display()
    );
    Ok(())
}

fn build_strategy(
    mode: SplitMode,
    options: &SplitOptions,
    config: &Config,
    interactive: bool,
) -> Result<SplitStrategy> {
    let split = &config.split;

    let chunk_ms = || -> Result<u64> {
        let minutes = match options.chunk_minutes {
            Some(m) => m,
            None if interactive => ask_number("Chunk length in minutes", split.chunk_minutes)?,
            None => split.chunk_minutes,
        };
        minutes_to_ms(minutes)
    };

    let silence = || -> Result<SilenceParams> {
        let min_silence_ms = match options.min_silence_ms {
            Some(ms) => ms,
            None if interactive => {
                ask_number("Minimum silence length in ms", split.min_silence_ms as f64)?.round()
                    as u64
            }
            None => split.min_silence_ms,
        };
        let thresh_dbfs = match options.silence_thresh {
            Some(db) => db,
            None if interactive => ask_number("Silence threshold in dBFS", split.silence_thresh_dbfs)?,
            None => split.silence_thresh_dbfs,
        };
        Ok(SilenceParams {
            min_silence_ms,
            thresh_dbfs,
        })
    };

    Ok(match mode {
        SplitMode::Chunk => SplitStrategy::FixedChunks {
            chunk_ms: chunk_ms()?,
        },
        SplitMode::Silence => {
            let silence = silence()?;
            let min_chunk_ms = match options.min_chunk_minutes {
                Some(m) => minutes_to_ms(m)?,
                None if interactive => minutes_to_ms(ask_number(
                    "Minimum chunk length in minutes",
                    split.min_chunk_ms as f64 / 60_000.0,
                )?)?,
                None => split.min_chunk_ms,
            };
            SplitStrategy::Silence {
                silence,
                min_chunk_ms,
            }
        }
        SplitMode::SilenceChunk => SplitStrategy::SilenceThenChunks {
            silence: silence()?,
            chunk_ms: chunk_ms()?,
        },
    })
}

fn ask_number(question: &str, default: f64) -> Result<f64> {
    loop {
        let answer = prompt::ask_or(question, &default.to_string())?;
        match answer.parse::<f64>() {
            Ok(n) if n.is_finite() => return Ok(n),
            _ => println!("Error: '{}' is not a number.", answer),
        }
    }
}

fn minutes_to_ms(minutes: f64) -> Result<u64> {
    if !minutes.is_finite() || minutes < 0.0 {
        bail!("Invalid length: {} minutes", minutes);
    }
    Ok((minutes * 60_000.0).round() as u64)
}

/// `.mp3` files directly inside `dir`, sorted by name.
async fn list_mp3_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_mp3 = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("mp3"))
            .unwrap_or(false);
        if is_mp3 && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
