pub mod console;
pub mod init;
pub mod log;
pub mod prompt;

use crate::access::AccessController;
use crate::audit::AuditLogger;
use crate::config::{parser, Config};
use crate::utils::paths;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Load the config from an explicit path, else the nearest `.homeguard.yaml`
/// above the current directory, else the built-in defaults.
/// Returns the config and the file it came from.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            paths::find_config_walking_up(&cwd)
        }
    };

    match path {
        Some(path) => {
            let config = parser::parse_config_file(&path)?;
            tracing::info!("Loaded config '{}' from {}", config.profile, path.display());
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// The audit log directory for a config loaded from `source`.
pub fn log_directory(config: &Config, source: Option<&Path>) -> Result<PathBuf> {
    paths::resolve_log_directory(config.audit.log_dir.as_deref(), source)
}

/// Run an interactive console session on stdin/stdout.
pub fn run_console(config_path: Option<&Path>) -> Result<()> {
    let (config, source) = load_config(config_path)?;

    let logger = if config.audit.enabled {
        let session_id = uuid::Uuid::new_v4().to_string();
        let log_dir = log_directory(&config, source.as_deref())?;
        Some(AuditLogger::new(&log_dir, &session_id).context("Failed to open audit log")?)
    } else {
        None
    };

    if let Some(ref path) = source {
        println!(
            "  {}",
            format!("Config: {} ({})", config.profile, path.display()).dimmed()
        );
    }
    if let Some(ref logger) = logger {
        println!(
            "  {}",
            format!("Audit log: {}", logger.log_path().display()).dimmed()
        );
    }

    let controller = AccessController::new(config.access_policy());
    let stdin = std::io::stdin();
    let prompter = prompt::Prompter::new(stdin.lock(), std::io::stdout());
    let mut console = console::Console::new(controller, prompter, logger);
    console.run()
}
