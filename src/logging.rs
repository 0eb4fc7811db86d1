//! File logging via `tracing`. The TUI owns the terminal, so nothing is
//! written to stdout or stderr.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Filter directives, e.g. `KBADMIN_LOG=kbadmin=debug`.
pub const LOG_ENV: &str = "KBADMIN_LOG";

const LOG_FILE_NAME: &str = "kbadmin.log";

/// Log file path: configured file, else the platform state directory.
pub fn resolve_log_file_path(config_file: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(p) = config_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "kbadmin", "kbadmin")
        .ok_or_else(|| anyhow!("could not determine a home directory for the log file"))?;
    // state_dir is Linux-only; elsewhere use the local data dir
    let dir = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    Ok(dir.join(LOG_FILE_NAME))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Returns the file being written to.
pub fn init_logging(config: &LoggingConfig, level: &str) -> Result<PathBuf> {
    let path = resolve_log_file_path(config.file.clone())?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Registry::default()
        .with(build_env_filter(level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file),
        )
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {}", e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_file_wins() {
        let path = resolve_log_file_path(Some(PathBuf::from("/tmp/kb.log"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/kb.log"));
    }

    #[test]
    fn empty_config_path_uses_default() {
        let path = resolve_log_file_path(Some(PathBuf::new())).unwrap();
        assert!(path.ends_with("kbadmin.log"));
        assert!(path.components().count() >= 2);
    }
}
