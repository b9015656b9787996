//! Filesystem locations: config discovery and the audit log directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the per-directory config file.
pub const CONFIG_FILE_NAME: &str = ".homeguard.yaml";

/// Find `.homeguard.yaml` walking up the directory tree from `start`.
pub fn find_config_walking_up(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// `~/.homeguard`
pub fn data_directory() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".homeguard"))
}

/// Default audit log directory (`~/.homeguard/logs/`).
pub fn default_log_directory() -> Result<PathBuf> {
    Ok(data_directory()?.join("logs"))
}

/// Expand a leading `~/` to the home directory. Other paths pass through.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("Could not determine home directory")?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// The audit log directory to use: the configured one, else the default.
/// A relative configured directory is taken from `config_file`'s directory
/// when the config came from a file.
pub fn resolve_log_directory(
    configured: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<PathBuf> {
    let Some(dir) = configured else {
        return default_log_directory();
    };
    let dir = expand_home(dir)?;
    match config_file.and_then(Path::parent) {
        Some(base) if dir.is_relative() => Ok(base.join(dir)),
        _ => Ok(dir),
    }
}
