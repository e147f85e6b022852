//! Edit lists over a source file
//!
//! An [`AudioClip`] never holds samples. It is an ordered list of millisecond
//! spans of one source file; slicing and concatenation rewrite the list and
//! only the exporter touches audio.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Span {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self {
            start_ms,
            end_ms: end_ms.max(start_ms),
        }
    }

    pub fn len_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    pub fn is_empty(&self) -> bool {
        self.len_ms() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    source: PathBuf,
    spans: Vec<Span>,
}

impl AudioClip {
    pub fn empty(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            spans: Vec::new(),
        }
    }

    /// The whole source, `0..duration_ms`.
    pub fn whole(source: impl Into<PathBuf>, duration_ms: u64) -> Self {
        Self::from_spans(source, [Span::new(0, duration_ms)])
    }

    pub fn from_spans(source: impl Into<PathBuf>, spans: impl IntoIterator<Item = Span>) -> Self {
        let mut clip = Self::empty(source);
        for span in spans {
            clip.push_span(span);
        }
        clip
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn duration_ms(&self) -> u64 {
        self.spans.iter().map(Span::len_ms).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Append a span, merging it into the previous one when they touch.
    fn push_span(&mut self, span: Span) {
        if span.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut() {
            if last.end_ms == span.start_ms {
                last.end_ms = span.end_ms;
                return;
            }
        }
        self.spans.push(span);
    }

    /// Concatenate `other` after this clip.
    pub fn append(&mut self, other: &AudioClip) {
        debug_assert_eq!(self.source, other.source);
        for span in &other.spans {
            self.push_span(*span);
        }
    }

    /// The part of this clip's timeline between `start_ms` and `end_ms`.
    pub fn slice(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let mut out = AudioClip::empty(self.source.clone());
        let mut cursor = 0u64;

        for span in &self.spans {
            let span_start = cursor;
            let span_end = cursor + span.len_ms();
            cursor = span_end;

            let lo = start_ms.max(span_start);
            let hi = end_ms.min(span_end);
            if lo < hi {
                out.push_span(Span::new(
                    span.start_ms + (lo - span_start),
                    span.start_ms + (hi - span_start),
                ));
            }
            if span_end >= end_ms {
                break;
            }
        }
        out
    }

    /// Consecutive windows of `chunk_ms`; the last one may be shorter.
    pub fn chunks(&self, chunk_ms: u64) -> Vec<AudioClip> {
        fixed_windows(self.duration_ms(), chunk_ms)
            .into_iter()
            .map(|(start, end)| self.slice(start, end))
            .collect()
    }
}

/// `[start, end)` windows covering `0..duration_ms`. Empty when `chunk_ms` is 0.
pub fn fixed_windows(duration_ms: u64, chunk_ms: u64) -> Vec<(u64, u64)> {
    if chunk_ms == 0 {
        return Vec::new();
    }
    (0..duration_ms)
        .step_by(chunk_ms as usize)
        .map(|start| (start, (start + chunk_ms).min(duration_ms)))
        .collect()
}
