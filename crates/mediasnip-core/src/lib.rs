//! mediasnip-core: metadata lookup, format selection and downloads via yt-dlp

pub mod auth;
pub mod config;
pub mod download;
pub mod error;
pub mod formats;
pub mod media;
pub mod platform;
pub mod probe;
pub mod process;
pub mod resolver;
pub mod selection;

pub use config::Config;
pub use error::{ConfigError, DownloadError, FormatError, ResolveError, SelectionError};
