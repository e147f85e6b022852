//! Configuration management for mediasnip

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pretty-print the raw yt-dlp metadata after each successful lookup
    pub debug: bool,
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub auth: AuthConfig,
    pub split: SplitConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
    /// Path to ffprobe binary (auto-detected if not set)
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where downloads land and where `split_chunks/` is created
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Netscape cookie file used when no username/password is given
    pub cookie_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Minimum silence length in milliseconds
    pub min_silence_ms: u64,
    /// Silence threshold in dBFS
    pub silence_thresh_dbfs: f64,
    /// Minimum length of a silence-delimited chunk in milliseconds
    pub min_chunk_ms: u64,
    /// Default fixed chunk length in minutes
    pub chunk_minutes: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum parallel downloads
    pub max_parallel: usize,
    /// Continue on error
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            paths: PathsConfig::default(),
            output: OutputConfig {
                directory: default_output_directory(),
            },
            auth: AuthConfig::default(),
            split: SplitConfig {
                min_silence_ms: 500,
                silence_thresh_dbfs: -40.0,
                min_chunk_ms: 300_000,
                chunk_minutes: 10.0,
            },
            batch: BatchConfig {
                max_parallel: 1,
                continue_on_error: true,
            },
        }
    }
}

fn default_output_directory() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediasnip")
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_config_file() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("MEDIASNIP_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/mediasnip/config.toml`
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("mediasnip/config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.max_parallel == 0 {
            return Err(ConfigError::InvalidValue(
                "batch.max_parallel must be at least 1".to_string(),
            ));
        }
        if self.split.chunk_minutes <= 0.0 {
            return Err(ConfigError::InvalidValue(
                "split.chunk_minutes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_binary(self.paths.yt_dlp.as_ref(), "yt-dlp")
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_binary(self.paths.ffmpeg.as_ref(), "ffmpeg")
    }

    /// Get ffprobe path, auto-detecting if not configured
    pub fn ffprobe_path(&self) -> Result<PathBuf, ConfigError> {
        resolve_binary(self.paths.ffprobe.as_ref(), "ffprobe")
    }

    /// yt-dlp path, or the bare program name so spawn errors surface as NotFound
    pub fn yt_dlp_program(&self) -> PathBuf {
        self.yt_dlp_path().unwrap_or_else(|_| PathBuf::from("yt-dlp"))
    }

    pub fn ffmpeg_program(&self) -> PathBuf {
        self.ffmpeg_path().unwrap_or_else(|_| PathBuf::from("ffmpeg"))
    }

    pub fn ffprobe_program(&self) -> PathBuf {
        self.ffprobe_path().unwrap_or_else(|_| PathBuf::from("ffprobe"))
    }
}

fn resolve_binary(configured: Option<&PathBuf>, name: &str) -> Result<PathBuf, ConfigError> {
    match configured {
        Some(path) => Ok(path.clone()),
        None => which::which(name)
            .map_err(|_| ConfigError::InvalidValue(format!("{} not found in PATH", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.split.min_silence_ms, 500);
        assert_eq!(config.split.silence_thresh_dbfs, -40.0);
        assert_eq!(config.split.min_chunk_ms, 300_000);
        assert_eq!(config.batch.max_parallel, 1);
        assert!(!config.debug);
        assert!(config.output.directory.ends_with("mediasnip"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "debug = true\n[split]\nmin_silence_ms = 750\n[output]\ndirectory = \"/tmp/snips\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.debug);
        assert_eq!(config.split.min_silence_ms, 750);
        assert_eq!(config.split.min_chunk_ms, 300_000);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/snips"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn test_zero_parallel_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[batch]\nmax_parallel = 0\n").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_to_toml_round_trips_sections() {
        let rendered = Config::default().to_toml().unwrap();
        assert!(rendered.contains("[split]"));
        assert!(rendered.contains("min_silence_ms = 500"));
    }

    #[test]
    fn test_configured_path_wins() {
        let mut config = Config::default();
        config.paths.yt_dlp = Some(PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.yt_dlp_path().unwrap(), PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.yt_dlp_program(), PathBuf::from("/opt/bin/yt-dlp"));
    }
}
