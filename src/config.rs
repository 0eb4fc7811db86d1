use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Admin API used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8001";

/// Per-request HTTP timeout (s). Uploads trigger server-side embedding, so this is generous.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How often the tick event fires (ms).
pub const TICK_RATE_MS: u64 = 250;

/// Pause between uploads in a bulk import (ms).
pub const BATCH_DELAY_MS: u64 = 1000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Overrides `[api] base_url`.
pub const API_URL_ENV: &str = "KBADMIN_API_URL";

pub const CONFIG_FILE: &str = ".kbadmin.toml";

// ---------------------------------------------------------------------------
// Project config (.kbadmin.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    pub api: Option<ApiConfig>,
    pub display: Option<DisplayConfig>,
    pub batch: Option<BatchConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct DisplayConfig {
    pub tick_rate: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct BatchConfig {
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off.
    pub level: Option<String>,
    /// Log file; defaults to the platform state directory.
    pub file: Option<PathBuf>,
}

impl ProjectConfig {
    /// Base URL with precedence: CLI flag, `KBADMIN_API_URL`, config file, default.
    pub fn api_base_url(&self, cli: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        pick_base_url(cli, env.as_deref(), self.configured_base_url())
    }

    fn configured_base_url(&self) -> Option<&str> {
        self.api.as_ref().and_then(|a| a.base_url.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|a| a.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn tick_rate(&self) -> u64 {
        self.display
            .as_ref()
            .and_then(|d| d.tick_rate)
            .unwrap_or(TICK_RATE_MS)
    }

    pub fn batch_delay(&self) -> Duration {
        let ms = self
            .batch
            .as_ref()
            .and_then(|b| b.delay_ms)
            .unwrap_or(BATCH_DELAY_MS);
        Duration::from_millis(ms)
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

fn pick_base_url(cli: Option<&str>, env: Option<&str>, config: Option<&str>) -> String {
    [cli, env, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}

/// Load project config from `.kbadmin.toml` in the given directory.
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load_project_config(cwd: &Path) -> ProjectConfig {
    let path = cwd.join(CONFIG_FILE);
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        toml::from_str(&content).unwrap_or_default()
    } else {
        ProjectConfig::default()
    }
}
