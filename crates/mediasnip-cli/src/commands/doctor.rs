use anyhow::Result;

use mediasnip_core::{
    probe::{probe_all, Dependency, DependencyReport},
    process::SystemRunner,
    Config,
};

pub async fn run(config: &Config) -> Result<()> {
    println!("mediasnip dependency check\n");

    let report = probe_all(&SystemRunner, config).await;

    for result in &report.results {
        let name = format!("{}:", result.dependency);
        if result.available {
            let version = result.version.as_deref().unwrap_or("unknown version");
            match result.path {
                Some(ref path) => println!("{:<10} OK ({}, {})", name, version, path.display()),
                None => println!("{:<10} OK ({})", name, version),
            }
        } else {
            println!("{:<10} NOT FOUND", name);
            println!("           {}", capitalize(result.dependency.purpose()));
            println!("           Install with: {}", result.dependency.install_hint());
        }
    }

    println!();
    if report.all_available() {
        println!("All dependencies OK!");
    } else {
        if !report.is_available(Dependency::YtDlp) {
            println!("Downloads are unavailable until yt-dlp is installed.");
        }
        if !report.is_available(Dependency::Ffmpeg) || !report.is_available(Dependency::Ffprobe) {
            println!("Audio extraction and splitting need both ffmpeg and ffprobe.");
        }
        println!("{}", missing_summary(&report));
    }

    Ok(())
}

fn missing_summary(report: &DependencyReport) -> String {
    let missing: Vec<String> = report
        .missing()
        .map(|r| r.dependency.to_string())
        .collect();
    format!(
        "Missing: {}. See above for installation instructions.",
        missing.join(", ")
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
