//! Configuration for the `memo` binary.
//!
//! Settings resolve with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/memo/config.toml`)
//! 4. Compiled defaults
//!
//! A missing default config file is not an error. An explicit `--config` path
//! that cannot be read is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("could not determine a data directory (no HOME or XDG_DATA_HOME)")]
    NoDataDir,
}

/// `config.toml` layout. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    store_dir: Option<PathBuf>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    poll_timeout_ms: Option<u64>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the task list blob.
    pub store_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log destination; `None` means `<temp dir>/memo.log`.
    pub log_file: Option<PathBuf>,
    /// How long the TUI waits for a key before checking for events.
    pub poll_timeout: Duration,
}

impl Config {
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";
    pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

    /// Resolve settings from the CLI, the config file and defaults.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };
        Self::resolve(cli, file)
    }

    fn resolve(cli: &Cli, file: ConfigFile) -> Result<Self, ConfigError> {
        let store_dir = match cli.store.clone().or(file.store_dir) {
            Some(dir) => dir,
            None => default_store_dir().ok_or(ConfigError::NoDataDir)?,
        };
        Ok(Config {
            store_dir,
            log_level: cli
                .log_level
                .clone()
                .or(file.log_level)
                .unwrap_or_else(|| Self::DEFAULT_LOG_LEVEL.to_string()),
            log_file: cli.log_file.clone().or(file.log_file),
            poll_timeout: file
                .poll_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(Self::DEFAULT_POLL_TIMEOUT),
        })
    }

    /// Where log lines go.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("memo.log"))
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

/// `~/.config/memo/config.toml` (platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("memo").join("config.toml"))
}

/// `~/.local/share/memo` (platform equivalent).
pub fn default_store_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("memo"))
}
