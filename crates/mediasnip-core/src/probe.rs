//! External dependency checks

use crate::config::Config;
use crate::process::ProcessRunner;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    YtDlp,
    Ffmpeg,
    Ffprobe,
}

impl Dependency {
    pub const ALL: [Dependency; 3] = [Dependency::YtDlp, Dependency::Ffmpeg, Dependency::Ffprobe];

    pub fn binary_name(self) -> &'static str {
        match self {
            Dependency::YtDlp => "yt-dlp",
            Dependency::Ffmpeg => "ffmpeg",
            Dependency::Ffprobe => "ffprobe",
        }
    }

    fn version_flag(self) -> &'static str {
        match self {
            Dependency::YtDlp => "--version",
            Dependency::Ffmpeg | Dependency::Ffprobe => "-version",
        }
    }

    /// What the tool loses without it.
    pub fn purpose(self) -> &'static str {
        match self {
            Dependency::YtDlp => "required for media info and downloads",
            Dependency::Ffmpeg => "required for audio extraction, merging video formats and audio splitting",
            Dependency::Ffprobe => "required for audio splitting",
        }
    }

    pub fn install_hint(self) -> &'static str {
        match self {
            Dependency::YtDlp => "pip install -U yt-dlp (or: brew install yt-dlp / pkg install yt-dlp)",
            Dependency::Ffmpeg | Dependency::Ffprobe => {
                "brew install ffmpeg (or: apt install ffmpeg / pkg install ffmpeg)"
            }
        }
    }

    fn configured_path(self, config: &Config) -> Option<PathBuf> {
        match self {
            Dependency::YtDlp => config.paths.yt_dlp.clone(),
            Dependency::Ffmpeg => config.paths.ffmpeg.clone(),
            Dependency::Ffprobe => config.paths.ffprobe.clone(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary_name())
    }
}

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub dependency: Dependency,
    pub available: bool,
    pub path: Option<PathBuf>,
    /// First line of the version output, trimmed to the version itself for ffmpeg
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DependencyReport {
    pub results: Vec<ProbeResult>,
}

impl DependencyReport {
    pub fn is_available(&self, dep: Dependency) -> bool {
        self.results
            .iter()
            .any(|r| r.dependency == dep && r.available)
    }

    pub fn all_available(&self) -> bool {
        self.results.iter().all(|r| r.available)
    }

    pub fn missing(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| !r.available)
    }
}

/// Run a version probe for every dependency. A missing binary and a failing
/// exit code both count as unavailable; nothing here returns an error.
pub async fn probe_all<R: ProcessRunner>(runner: &R, config: &Config) -> DependencyReport {
    let mut results = Vec::with_capacity(Dependency::ALL.len());
    for dep in Dependency::ALL {
        results.push(probe(runner, config, dep).await);
    }
    DependencyReport { results }
}

pub async fn probe<R: ProcessRunner>(runner: &R, config: &Config, dep: Dependency) -> ProbeResult {
    let program = dep
        .configured_path(config)
        .or_else(|| which::which(dep.binary_name()).ok())
        .unwrap_or_else(|| PathBuf::from(dep.binary_name()));

    let args = [OsString::from(dep.version_flag())];
    let (available, version) = match runner.capture(&program, &args).await {
        Ok(out) if out.success() => (true, parse_version(dep, &out.stdout_lossy())),
        Ok(out) => {
            debug!("{} probe exited with {:?}", dep, out.code);
            (false, None)
        }
        Err(e) => {
            debug!("{} probe failed: {}", dep, e);
            (false, None)
        }
    };

    ProbeResult {
        dependency: dep,
        available,
        path: available.then_some(program),
        version,
    }
}

fn parse_version(dep: Dependency, stdout: &str) -> Option<String> {
    let first = stdout.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    match dep {
        // "ffmpeg version 7.1 Copyright ..." -> "7.1"
        Dependency::Ffmpeg | Dependency::Ffprobe => first
            .split_whitespace()
            .nth(2)
            .map(str::to_string)
            .or_else(|| Some(first.to_string())),
        Dependency::YtDlp => Some(first.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::{fail, ok, FakeRunner, Scripted};

    #[tokio::test]
    async fn test_probe_all_never_errors() {
        let runner = FakeRunner::new(vec![
            ok("2024.12.13\n"),
            fail(1, "broken"),
            Scripted::NotFound,
        ]);
        let report = probe_all(&runner, &Config::default()).await;

        assert!(report.is_available(Dependency::YtDlp));
        assert!(!report.is_available(Dependency::Ffmpeg));
        assert!(!report.is_available(Dependency::Ffprobe));
        assert!(!report.all_available());
        assert_eq!(report.missing().count(), 2);
        assert_eq!(report.results[0].version.as_deref(), Some("2024.12.13"));

        let flags: Vec<String> = runner.calls().into_iter().map(|c| c[0].clone()).collect();
        assert_eq!(flags, vec!["--version", "-version", "-version"]);
    }

    #[test]
    fn test_parse_ffmpeg_version() {
        assert_eq!(
            parse_version(Dependency::Ffmpeg, "ffmpeg version 7.1 Copyright (c) 2000-2024\n"),
            Some("7.1".to_string())
        );
        assert_eq!(parse_version(Dependency::Ffprobe, ""), None);
    }
}
