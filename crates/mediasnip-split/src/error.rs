//! Error types for audio splitting

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("FFmpeg not found. Install with: brew install ffmpeg (or: apt install ffmpeg / pkg install ffmpeg)")]
    FfmpegNotFound,

    #[error("ffprobe not found. It ships with FFmpeg: brew install ffmpeg (or: apt install ffmpeg)")]
    FfprobeNotFound,

    #[error("Could not read audio duration of {path}: {detail}")]
    Probe { path: PathBuf, detail: String },

    #[error("Silence detection failed: {0}")]
    Detect(String),

    #[error("Failed to export {path}: {detail}")]
    Export { path: PathBuf, detail: String },

    #[error("Chunk length must be greater than zero")]
    InvalidChunkLength,

    #[error("Input audio is empty: {0}")]
    EmptyInput(PathBuf),

    #[error("No non-silent segments detected. Try adjusting silence parameters.")]
    NoSegments,

    #[error("No chunks meet the minimum length of {min_chunk_ms} ms. Try adjusting silence parameters.")]
    NoChunksMeetMinimum { min_chunk_ms: u64 },

    #[error(
        "After removing silence, audio duration ({:.1}s) is shorter than requested chunk length ({:.1}s)",
        secs(.actual_ms),
        secs(.requested_ms)
    )]
    TooShort { actual_ms: u64, requested_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn secs(ms: &u64) -> f64 {
    *ms as f64 / 1000.0
}
