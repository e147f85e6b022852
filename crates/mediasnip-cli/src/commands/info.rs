use anyhow::Result;

use super::{resolve_auth, spinner, truncate};
use crate::args::AuthArgs;
use mediasnip_core::{
    formats::available_video_formats, media::MediaInfo, process::SystemRunner,
    resolver::InfoResolver, Config,
};

pub async fn run(url: &str, auth: &AuthArgs, config: &Config) -> Result<()> {
    let auth = resolve_auth(auth, config)?;
    let info = fetch(url, &auth, config).await?;

    println!("Title: {}", info.title());
    println!("Type:  {}", info.media_type());

    if info.is_collection() {
        match info.entry_count() {
            Some(n) => println!("Items: {}", n),
            None => println!("Items: unknown"),
        }
        return Ok(());
    }

    let options = available_video_formats(&info);
    if options.is_empty() {
        println!("\nNo video formats offered (audio extraction is still possible)");
    } else {
        println!("\nVideo formats:");
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
    }
    Ok(())
}

/// Resolve metadata behind a spinner.
pub(crate) async fn fetch(
    url: &str,
    auth: &mediasnip_core::auth::Auth,
    config: &Config,
) -> Result<MediaInfo> {
    let resolver = resolver(config);

    let pb = spinner(format!("Fetching media info: {}", truncate(url, 60)), config.debug)?;
    let result = resolver.resolve(url, auth).await;
    pb.finish_and_clear();

    Ok(result?)
}

fn resolver(config: &Config) -> InfoResolver<SystemRunner> {
    InfoResolver::new(SystemRunner, config.yt_dlp_program()).with_debug_dump(config.debug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_reaches_resolver() {
        let mut config = Config::default();
        assert!(!resolver(&config).debug_dump_enabled());

        config.debug = true;
        assert!(resolver(&config).debug_dump_enabled());
    }
}
