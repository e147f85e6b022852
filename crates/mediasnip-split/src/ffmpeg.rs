//! FFmpeg-backed audio operations

use crate::clip::AudioClip;
use crate::error::SplitError;
use crate::silence::{ms_to_secs, parse_silencedetect, SilenceParams};
use crate::AudioBackend;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Everything the splitter needs from the outside world.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl FfmpegBackend {
    pub fn new(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }
}

fn ffmpeg_spawn_error(e: std::io::Error) -> SplitError {
    if e.kind() == std::io::ErrorKind::NotFound {
        SplitError::FfmpegNotFound
    } else {
        SplitError::Io(e)
    }
}

#[async_trait]
impl AudioBackend for FfmpegBackend {
    async fn duration_ms(&self, input: &Path) -> Result<u64, SplitError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v", "error",
                "-show_entries", "format=duration",
                "-of", "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SplitError::FfprobeNotFound
                } else {
                    SplitError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(SplitError::Probe {
                path: input.to_path_buf(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_duration_ms(&stdout).ok_or_else(|| SplitError::Probe {
            path: input.to_path_buf(),
            detail: format!("unexpected ffprobe output: {:?}", stdout.trim()),
        })
    }

    async fn detect_silence(
        &self,
        input: &Path,
        params: &SilenceParams,
        duration_ms: u64,
    ) -> Result<Vec<crate::clip::Span>, SplitError> {
        info!("Detecting silence ({})", params.filter());

        let output = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-nostats", "-i"])
            .arg(input)
            .args(["-af", &params.filter(), "-f", "null", "-"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(ffmpeg_spawn_error)?;

        // silencedetect reports on stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(SplitError::Detect(last_lines(&stderr, 5)));
        }

        let silences = parse_silencedetect(&stderr, duration_ms);
        debug!("Found {} silent range(s)", silences.len());
        Ok(silences)
    }

    async fn export_mp3(&self, clip: &AudioClip, output: &Path) -> Result<(), SplitError> {
        let mut script = tempfile::Builder::new()
            .prefix("mediasnip-filter-")
            .suffix(".txt")
            .tempfile()?;
        script.write_all(filter_graph(clip).as_bytes())?;
        script.flush()?;

        let result = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(clip.source())
            .arg("-filter_complex_script")
            .arg(script.path())
            .args(["-map", "[out]", "-vn", "-c:a", "libmp3lame"])
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(ffmpeg_spawn_error)?;

        if !result.status.success() {
            return Err(SplitError::Export {
                path: output.to_path_buf(),
                detail: last_lines(&String::from_utf8_lossy(&result.stderr), 5),
            });
        }

        debug!("Exported {} ({} ms)", output.display(), clip.duration_ms());
        Ok(())
    }
}

/// `atrim` each span out of input 0 and concatenate them into `[out]`.
pub fn filter_graph(clip: &AudioClip) -> String {
    let spans = clip.spans();
    if spans.is_empty() {
        return "anullsrc=d=0[out]".to_string();
    }

    let mut graph = String::new();
    for (i, span) in spans.iter().enumerate() {
        graph.push_str(&format!(
            "[0:a]atrim=start={}:end={},asetpts=PTS-STARTPTS[a{}];\n",
            ms_to_secs(span.start_ms),
            ms_to_secs(span.end_ms),
            i
        ));
    }
    for i in 0..spans.len() {
        graph.push_str(&format!("[a{}]", i));
    }
    graph.push_str(&format!("concat=n={}:v=0:a=1[out]", spans.len()));
    graph
}

fn parse_duration_ms(stdout: &str) -> Option<u64> {
    let secs: f64 = stdout.lines().next()?.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some((secs * 1000.0).round() as u64)
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
