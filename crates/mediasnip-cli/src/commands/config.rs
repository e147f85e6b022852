use anyhow::Result;
use std::path::Path;
use mediasnip_core::Config;

pub async fn run(config: &Config, config_path: Option<&Path>) -> Result<()> {
    println!("mediasnip configuration\n");
    println!("{}", config.to_toml()?);

    // Show config file locations
    println!("Config file locations (in priority order):");
    println!("  1. Environment variables (MEDIASNIP_*, nested keys split on __)");
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    if let Some(default) = Config::default_config_file() {
        let status = if default.exists() { "" } else { " (not present)" };
        println!("  3. {}{}", default.display(), status);
    }
    println!("  4. Built-in defaults");

    println!("\nBinaries:");
    for (name, path) in [
        ("yt_dlp", config.yt_dlp_path()),
        ("ffmpeg", config.ffmpeg_path()),
        ("ffprobe", config.ffprobe_path()),
    ] {
        match path {
            Ok(p) => println!("  {} = {:?}", name, p),
            Err(_) => println!("  {} = (not found)", name),
        }
    }

    Ok(())
}
