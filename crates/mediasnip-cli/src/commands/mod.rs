pub mod batch;
pub mod config;
pub mod doctor;
pub mod download;
pub mod info;
pub mod prompt;
pub mod split;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::args::AuthArgs;
use mediasnip_core::{auth::Auth, Config};

/// Build the auth options for a lookup or download. A username without a
/// password asks for one on the terminal; the configured cookie jar is used
/// when none is given on the command line.
pub fn resolve_auth(args: &AuthArgs, config: &Config) -> Result<Auth> {
    let password = match (&args.username, &args.password) {
        (Some(user), None) => Some(prompt::ask(&format!("Password for {}: ", user))?),
        (_, password) => password.clone(),
    };

    Ok(Auth {
        username: args.username.clone(),
        password,
        cookie_file: args
            .cookies
            .clone()
            .or_else(|| config.auth.cookie_file.clone()),
        save_cookies_to: args.save_cookies.clone(),
    })
}

/// Spinner shown while waiting on an external tool. Hidden in debug mode so
/// raw metadata dumps are not interleaved with redraws.
pub fn spinner(message: impl Into<String>, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
