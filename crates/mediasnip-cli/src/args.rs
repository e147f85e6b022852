use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediasnip")]
#[command(author, version, about = "Download video or audio with yt-dlp and split audio into chunks")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// URL to download (shorthand for `download <URL>`)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the raw metadata returned by yt-dlp
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what a URL resolves to and which formats are offered
    Info {
        url: String,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Download video or audio from a URL
    Download {
        url: String,

        #[command(flatten)]
        options: DownloadOptions,
    },

    /// Download every URL listed in a file
    Batch {
        /// File containing URLs (one per line, `#` starts a comment)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum parallel downloads (default from config)
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Extract audio as MP3 instead of downloading video
        #[arg(short, long)]
        audio: bool,

        /// Format selector passed to yt-dlp for video downloads
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Split an MP3 file into chunks
    Split {
        /// Audio file to split. Without it, pick from the MP3 files in the output directory
        file: Option<PathBuf>,

        #[command(flatten)]
        options: SplitOptions,
    },

    /// Check external dependencies
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct AuthArgs {
    /// Account username
    #[arg(short = 'u', long)]
    pub username: Option<String>,

    /// Account password (prompted when a username is given without one)
    #[arg(long, env = "MEDIASNIP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Netscape cookie file, used when no username/password is given
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    /// Where to save session cookies after logging in
    #[arg(long, value_name = "FILE", requires = "username")]
    pub save_cookies: Option<PathBuf>,
}

#[derive(clap::Args, Clone, Debug)]
pub struct DownloadOptions {
    /// Extract audio as MP3 instead of downloading video
    #[arg(short, long, conflicts_with = "format")]
    pub audio: bool,

    /// Video format: a height such as `720`, a label such as `720p`, or a raw yt-dlp selector
    #[arg(short, long)]
    pub format: Option<String>,

    /// Playlist items to download, e.g. `1,3,5`, `2-4` or `all`
    #[arg(short, long)]
    pub items: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SplitOptions {
    /// Splitting method (prompted when omitted)
    #[arg(short, long, value_enum)]
    pub mode: Option<SplitMode>,

    /// Chunk length in minutes for `chunk` and `silence-chunk`
    #[arg(long)]
    pub chunk_minutes: Option<f64>,

    /// Minimum silence length in milliseconds
    #[arg(long)]
    pub min_silence_ms: Option<u64>,

    /// Silence threshold in dBFS
    #[arg(long, allow_hyphen_values = true)]
    pub silence_thresh: Option<f64>,

    /// Minimum chunk length in minutes for `silence`
    #[arg(long)]
    pub min_chunk_minutes: Option<f64>,

    /// Output directory (chunks go to its `split_chunks` subdirectory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    /// Fixed-length chunks
    Chunk,
    /// One chunk per non-silent segment
    Silence,
    /// Remove silence, then fixed-length chunks
    SilenceChunk,
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitMode::Chunk => write!(f, "Split by chunk length"),
            SplitMode::Silence => write!(f, "Split by silence detection"),
            SplitMode::SilenceChunk => write!(f, "Remove silence, then split by chunk length"),
        }
    }
}
