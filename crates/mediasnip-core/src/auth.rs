//! Login and cookie options shared by metadata lookups and downloads

use crate::process::push_args;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Auth {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Cookie jar to load when no login is given
    pub cookie_file: Option<PathBuf>,
    /// Where to persist cookies after a successful login
    pub save_cookies_to: Option<PathBuf>,
}

impl Auth {
    pub fn none() -> Self {
        Self::default()
    }

    /// Username and password, only when both are present and non-empty.
    pub fn login(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }

    pub fn has_login(&self) -> bool {
        self.login().is_some()
    }

    /// Flags for a metadata lookup. The cookie file is only used without a login.
    pub fn lookup_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some((user, pass)) = self.login() {
            push_args(&mut args, ["--username", user, "--password", pass]);
        } else if let Some(ref cookies) = self.cookie_file {
            push_args(&mut args, ["--cookies"]);
            args.push(cookies.clone().into_os_string());
        }
        args
    }

    /// Flags for a download. After a login, yt-dlp writes the session back to
    /// the `--cookies` jar, which is how cookies get saved.
    pub fn download_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some((user, pass)) = self.login() {
            push_args(&mut args, ["--username", user, "--password", pass]);
            if let Some(ref save) = self.save_cookies_to {
                push_args(&mut args, ["--cookies"]);
                args.push(save.clone().into_os_string());
            }
        } else if let Some(ref cookies) = self.cookie_file {
            push_args(&mut args, ["--cookies"]);
            args.push(cookies.clone().into_os_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_login_takes_precedence_over_cookie_file() {
        let auth = Auth {
            username: Some("me".into()),
            password: Some("secret".into()),
            cookie_file: Some(PathBuf::from("jar.txt")),
            save_cookies_to: None,
        };
        assert_eq!(
            strings(auth.lookup_args()),
            vec!["--username", "me", "--password", "secret"]
        );
        assert_eq!(
            strings(auth.download_args()),
            vec!["--username", "me", "--password", "secret"]
        );
    }

    #[test]
    fn test_save_cookies_only_with_login() {
        let auth = Auth {
            username: Some("me".into()),
            password: Some("secret".into()),
            cookie_file: None,
            save_cookies_to: Some(PathBuf::from("saved.txt")),
        };
        assert_eq!(
            strings(auth.download_args()),
            vec!["--username", "me", "--password", "secret", "--cookies", "saved.txt"]
        );

        let no_login = Auth {
            save_cookies_to: Some(PathBuf::from("saved.txt")),
            ..Auth::default()
        };
        assert!(no_login.download_args().is_empty());
    }

    #[test]
    fn test_partial_login_falls_back_to_cookies() {
        let auth = Auth {
            username: Some("me".into()),
            password: None,
            cookie_file: Some(PathBuf::from("jar.txt")),
            save_cookies_to: None,
        };
        assert!(!auth.has_login());
        assert_eq!(strings(auth.lookup_args()), vec!["--cookies", "jar.txt"]);
        assert_eq!(strings(auth.download_args()), vec!["--cookies", "jar.txt"]);
    }
}
