mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};
use mediasnip_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "mediasnip=info",
        1 => "mediasnip=debug",
        2 => "mediasnip=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config_path = cli.config.as_deref();
    let mut config = Config::load(config_path)?;
    if cli.debug {
        config.debug = true;
    }

    match cli.command {
        Some(Commands::Info { url, auth }) => commands::info::run(&url, &auth, &config).await,
        Some(Commands::Download { url, options }) => {
            commands::download::run(&url, &options, &config).await
        }
        Some(Commands::Batch {
            input,
            parallel,
            audio,
            format,
            output,
            auth,
        }) => {
            let options = commands::batch::BatchOptions {
                parallel: parallel.unwrap_or(config.batch.max_parallel),
                audio,
                format,
                output,
                auth,
            };
            commands::batch::run(&input, &options, &config).await
        }
        Some(Commands::Split { file, options }) => {
            commands::split::run(file.as_deref(), &options, &config).await
        }
        Some(Commands::Doctor) => commands::doctor::run(&config).await,
        Some(Commands::Config) => commands::config::run(&config, config_path).await,
        None => {
            // If URL provided directly, treat as download command
            if let Some(url) = cli.url {
                let options = args::DownloadOptions {
                    audio: false,
                    format: None,
                    items: None,
                    output: None,
                    auth: args::AuthArgs::default(),
                };
                commands::download::run(&url, &options, &config).await
            } else {
                // No URL, print help
                use clap::CommandFactory;
                Cli::command().print_help()?;
                println!();
                Ok(())
            }
        }
    }
}
