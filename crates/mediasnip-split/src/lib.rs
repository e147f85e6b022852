//! Audio splitting bridge for mediasnip
//!
//! Splits an audio file into mp3 chunks in one of three ways:
//! - Fixed-length chunks
//! - Silence-delimited segments, keeping those above a minimum length
//! - Silence removed first, then fixed-length chunks of what remains
//!
//! Decoding, silence detection and encoding are done by FFmpeg; this crate
//! only decides which spans of the source end up in which chunk.

mod clip;
mod error;
mod ffmpeg;
mod silence;

pub use clip::{fixed_windows, AudioClip, Span};
pub use error::SplitError;
pub use ffmpeg::FfmpegBackend;
pub use silence::{SilenceParams, KEEP_SILENCE_MS};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

/// Subdirectory of the output directory that receives chunks.
pub const CHUNK_DIR_NAME: &str = "split_chunks";

#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Length of the input in milliseconds.
    async fn duration_ms(&self, input: &Path) -> Result<u64, SplitError>;

    /// Silent ranges of the input, in order.
    async fn detect_silence(
        &self,
        input: &Path,
        params: &SilenceParams,
        duration_ms: u64,
    ) -> Result<Vec<Span>, SplitError>;

    /// Render `clip` to an mp3 file.
    async fn export_mp3(&self, clip: &AudioClip, output: &Path) -> Result<(), SplitError>;
}

/// Splitting method selection
#[derive(Debug, Clone, PartialEq)]
pub enum SplitStrategy {
    /// Consecutive windows of `chunk_ms`
    FixedChunks { chunk_ms: u64 },
    /// Non-silent segments at least `min_chunk_ms` long
    Silence {
        silence: SilenceParams,
        min_chunk_ms: u64,
    },
    /// All non-silent audio joined, then cut into `chunk_ms` windows
    SilenceThenChunks {
        silence: SilenceParams,
        chunk_ms: u64,
    },
}

impl std::fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitStrategy::FixedChunks { chunk_ms } => {
                write!(f, "chunks of {:.1} minutes", *chunk_ms as f64 / 60_000.0)
            }
            SplitStrategy::Silence { .. } => write!(f, "silence detection"),
            SplitStrategy::SilenceThenChunks { chunk_ms, .. } => write!(
                f,
                "silence removal, then chunks of {:.1} minutes",
                *chunk_ms as f64 / 60_000.0
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SplitJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub strategy: SplitStrategy,
}

impl SplitJob {
    pub fn chunk_dir(&self) -> PathBuf {
        self.output_dir.join(CHUNK_DIR_NAME)
    }

    /// `<chunk_dir>/<stem>_chunk<N>.mp3`, N starting at 1
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        self.chunk_dir().join(format!("{}_chunk{}.mp3", stem, index))
    }
}

/// Progress events
#[derive(Debug, Clone)]
pub enum SplitEvent {
    Analyzing,
    Exporting { total: usize },
    ChunkSaved { index: usize, total: usize, path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct SplitReport {
    pub chunk_dir: PathBuf,
    pub chunks: Vec<PathBuf>,
}

pub struct Splitter<B> {
    backend: B,
    progress_tx: Option<mpsc::Sender<SplitEvent>>,
}

impl<B: AudioBackend> Splitter<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<SplitEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    async fn emit(&self, event: SplitEvent) {
        if let Some(ref tx) = self.progress_tx {
            let _ = tx.send(event).await;
        }
    }

    pub async fn split(&self, job: &SplitJob) -> Result<SplitReport, SplitError> {
        info!("Splitting {} by {}", job.input.display(), job.strategy);

        self.emit(SplitEvent::Analyzing).await;
        let clips = self.plan(job).await?;

        let chunk_dir = job.chunk_dir();
        tokio::fs::create_dir_all(&chunk_dir).await?;

        let total = clips.len();
        self.emit(SplitEvent::Exporting { total }).await;

        let mut chunks = Vec::with_capacity(total);
        for (i, clip) in clips.iter().enumerate() {
            let path = job.chunk_path(i + 1);
            self.backend.export_mp3(clip, &path).await?;
            info!("Saved chunk: {}", path.display());
            self.emit(SplitEvent::ChunkSaved {
                index: i + 1,
                total,
                path: path.clone(),
            })
            .await;
            chunks.push(path);
        }

        info!("Audio split into {} chunks in: {}", chunks.len(), chunk_dir.display());
        Ok(SplitReport { chunk_dir, chunks })
    }

    /// Decide every chunk before anything is written.
    pub async fn plan(&self, job: &SplitJob) -> Result<Vec<AudioClip>, SplitError> {
        let chunk_ms = match job.strategy {
            SplitStrategy::FixedChunks { chunk_ms }
            | SplitStrategy::SilenceThenChunks { chunk_ms, .. } => Some(chunk_ms),
            SplitStrategy::Silence { .. } => None,
        };
        if chunk_ms == Some(0) {
            return Err(SplitError::InvalidChunkLength);
        }

        let duration_ms = self.backend.duration_ms(&job.input).await?;
        if duration_ms == 0 {
            return Err(SplitError::EmptyInput(job.input.clone()));
        }

        match job.strategy {
            SplitStrategy::FixedChunks { chunk_ms } => {
                Ok(AudioClip::whole(&job.input, duration_ms).chunks(chunk_ms))
            }
            SplitStrategy::Silence {
                silence,
                min_chunk_ms,
            } => {
                let segments = self.non_silent(job, &silence, duration_ms).await?;
                let kept: Vec<AudioClip> = segments
                    .into_iter()
                    .filter(|c| c.duration_ms() >= min_chunk_ms)
                    .collect();
                if kept.is_empty() {
                    return Err(SplitError::NoChunksMeetMinimum { min_chunk_ms });
                }
                Ok(kept)
            }
            SplitStrategy::SilenceThenChunks { silence, chunk_ms } => {
                let segments = self.non_silent(job, &silence, duration_ms).await?;
                if segments.is_empty() {
                    return Err(SplitError::NoSegments);
                }

                let mut joined = AudioClip::empty(&job.input);
                for segment in &segments {
                    joined.append(segment);
                }

                let joined_ms = joined.duration_ms();
                if joined_ms < chunk_ms {
                    return Err(SplitError::TooShort {
                        actual_ms: joined_ms,
                        requested_ms: chunk_ms,
                    });
                }
                Ok(joined.chunks(chunk_ms))
            }
        }
    }

    /// Non-silent segments padded with [`KEEP_SILENCE_MS`] on each side.
    async fn non_silent(
        &self,
        job: &SplitJob,
        params: &SilenceParams,
        duration_ms: u64,
    ) -> Result<Vec<AudioClip>, SplitError> {
        let silences = self
            .backend
            .detect_silence(&job.input, params, duration_ms)
            .await?;
        let nonsilent = silence::nonsilent_ranges(&silences, duration_ms);
        let padded = silence::pad_segments(&nonsilent, KEEP_SILENCE_MS, duration_ms);

        Ok(padded
            .into_iter()
            .map(|span| AudioClip::from_spans(&job.input, [span]))
            .filter(|clip| !clip.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeBackend {
        duration_ms: u64,
        silences: Vec<Span>,
        exported: Mutex<Vec<(PathBuf, u64)>>,
    }

    impl FakeBackend {
        fn new(duration_ms: u64, silences: Vec<Span>) -> Self {
            Self {
                duration_ms,
                silences,
                exported: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AudioBackend for FakeBackend {
        async fn duration_ms(&self, _input: &Path) -> Result<u64, SplitError> {
            Ok(self.duration_ms)
        }

        async fn detect_silence(
            &self,
            _input: &Path,
            _params: &SilenceParams,
            _duration_ms: u64,
        ) -> Result<Vec<Span>, SplitError> {
            Ok(self.silences.clone())
        }

        async fn export_mp3(&self, clip: &AudioClip, output: &Path) -> Result<(), SplitError> {
            std::fs::write(output, b"mp3")?;
            self.exported
                .lock()
                .unwrap()
                .push((output.to_path_buf(), clip.duration_ms()));
            Ok(())
        }
    }

    fn job(dir: &Path, strategy: SplitStrategy) -> SplitJob {
        SplitJob {
            input: dir.join("lecture.mp3"),
            output_dir: dir.to_path_buf(),
            strategy,
        }
    }

    #[tokio::test]
    async fn test_fixed_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(FakeBackend::new(25_000, vec![]));
        let report = splitter
            .split(&job(dir.path(), SplitStrategy::FixedChunks { chunk_ms: 10_000 }))
            .await
            .unwrap();

        assert_eq!(report.chunks.len(), 3);
        assert_eq!(report.chunk_dir, dir.path().join("split_chunks"));
        assert_eq!(
            report.chunks[2],
            dir.path().join("split_chunks/lecture_chunk3.mp3")
        );
        let lens: Vec<u64> = splitter
            .backend
            .exported
            .lock()
            .unwrap()
            .iter()
            .map(|(_, len)| *len)
            .collect();
        assert_eq!(lens, vec![10_000, 10_000, 5_000]);
    }

    #[tokio::test]
    async fn test_silence_filters_short_segments() {
        let dir = tempfile::tempdir().unwrap();
        // non-silent: 0-4000, 5000-5300, 6000-20000
        let backend = FakeBackend::new(
            20_000,
            vec![Span::new(4_000, 5_000), Span::new(5_300, 6_000)],
        );
        let splitter = Splitter::new(backend);
        let strategy = SplitStrategy::Silence {
            silence: SilenceParams::default(),
            min_chunk_ms: 1_000,
        };
        let report = splitter.split(&job(dir.path(), strategy)).await.unwrap();

        assert_eq!(report.chunks.len(), 2);
        let lens: Vec<u64> = splitter
            .backend
            .exported
            .lock()
            .unwrap()
            .iter()
            .map(|(_, len)| *len)
            .collect();
        assert_eq!(lens, vec![4_200, 14_200]);
    }

    #[tokio::test]
    async fn test_silence_nothing_long_enough() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(FakeBackend::new(10_000, vec![Span::new(1_000, 10_000)]));
        let strategy = SplitStrategy::Silence {
            silence: SilenceParams::default(),
            min_chunk_ms: 300_000,
        };
        assert!(matches!(
            splitter.split(&job(dir.path(), strategy)).await,
            Err(SplitError::NoChunksMeetMinimum { min_chunk_ms: 300_000 })
        ));
    }

    #[tokio::test]
    async fn test_silence_then_chunks() {
        let dir = tempfile::tempdir().unwrap();
        // non-silent 0-10000 and 20000-30000, padded to 0-10200 and 19800-30000
        let splitter = Splitter::new(FakeBackend::new(30_000, vec![Span::new(10_000, 20_000)]));
        let strategy = SplitStrategy::SilenceThenChunks {
            silence: SilenceParams::default(),
            chunk_ms: 8_000,
        };
        let report = splitter.split(&job(dir.path(), strategy)).await.unwrap();

        let lens: Vec<u64> = splitter
            .backend
            .exported
            .lock()
            .unwrap()
            .iter()
            .map(|(_, len)| *len)
            .collect();
        assert_eq!(lens, vec![8_000, 8_000, 4_400]);
        assert_eq!(report.chunks.len(), 3);
    }

    #[tokio::test]
    async fn test_silence_then_chunks_too_short_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(FakeBackend::new(60_000, vec![Span::new(5_000, 60_000)]));
        let strategy = SplitStrategy::SilenceThenChunks {
            silence: SilenceParams::default(),
            chunk_ms: 10_000,
        };

        match splitter.split(&job(dir.path(), strategy)).await {
            Err(SplitError::TooShort {
                actual_ms,
                requested_ms,
            }) => {
                assert_eq!(actual_ms, 5_200);
                assert_eq!(requested_ms, 10_000);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(splitter.backend.exported.lock().unwrap().is_empty());
        assert!(!dir.path().join("split_chunks").exists());
    }

    #[tokio::test]
    async fn test_all_silent_has_no_segments() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(FakeBackend::new(5_000, vec![Span::new(0, 5_000)]));
        let strategy = SplitStrategy::SilenceThenChunks {
            silence: SilenceParams::default(),
            chunk_ms: 1_000,
        };
        assert!(matches!(
            splitter.split(&job(dir.path(), strategy)).await,
            Err(SplitError::NoSegments)
        ));
    }

    #[tokio::test]
    async fn test_zero_chunk_length_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let splitter = Splitter::new(FakeBackend::new(5_000, vec![]));
        assert!(matches!(
            splitter
                .split(&job(dir.path(), SplitStrategy::FixedChunks { chunk_ms: 0 }))
                .await,
            Err(SplitError::InvalidChunkLength)
        ));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let splitter = Splitter::new(FakeBackend::new(2_500, vec![])).with_progress(tx);
        splitter
            .split(&job(dir.path(), SplitStrategy::FixedChunks { chunk_ms: 1_000 }))
            .await
            .unwrap();
        drop(splitter);

        let mut saved = 0;
        while let Some(event) = rx.recv().await {
            if let SplitEvent::ChunkSaved { index, total, .. } = event {
                saved += 1;
                assert_eq!(index, saved);
                assert_eq!(total, 3);
            }
        }
        assert_eq!(saved, 3);
    }
}
