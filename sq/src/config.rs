//! Homedir resolution: `--homedir`, then `$RPGP_HOME`, then the
//! platform default, mirroring how GnuPG-compatible tooling locates
//! its key stores.

use std::path::{Path, PathBuf};

use rpgp_core::key_store::{discover_homedir, HomedirLayout};

/// Resolved configuration for one invocation of the tool.
pub struct Config {
    pub homedir: PathBuf,
    pub force: bool,
}

impl Config {
    /// Resolves the homedir from (in priority order) an explicit
    /// `--homedir` argument, the `RPGP_HOME` environment variable, or
    /// the platform default (`~/.gnupg` on Unix, the equivalent
    /// `%APPDATA%\gnupg` on Windows).
    pub fn new(homedir_arg: Option<&str>, force: bool) -> Self {
        let homedir = homedir_arg
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("RPGP_HOME").map(PathBuf::from))
            .unwrap_or_else(default_homedir);
        Config { homedir, force }
    }

    /// Looks up the public/secret codec pair this homedir uses, per
    /// [`discover_homedir`].
    pub fn layout(&self) -> Option<HomedirLayout> {
        discover_homedir(&self.homedir)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.homedir.join(name)
    }
}

#[cfg(unix)]
fn default_homedir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join(".gnupg")
}

#[cfg(not(unix))]
fn default_homedir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join("gnupg")
}
