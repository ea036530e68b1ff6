//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "notekeep";
const DB_FILE_NAME: &str = "notekeep.sqlite3";

/// Settings loaded from `config.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQLite database file.
    pub db_path: Option<PathBuf>,

    /// One of trace|debug|info|warn|error.
    pub log_level: Option<String>,

    /// Directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration.
    ///
    /// An explicit `path` must exist. The default location is optional and
    /// yields the default config when missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };

        if !required && !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Default: `~/.config/notekeep/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Precedence: CLI `--db`, config `db_path`, platform data dir.
    pub fn db_path(&self, cli_db: Option<&PathBuf>) -> PathBuf {
        cli_db
            .cloned()
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(|| data_dir().join(DB_FILE_NAME))
    }

    /// Precedence: CLI `--log-level`, config `log_level`, build default.
    pub fn log_level(&self, cli_level: Option<&str>) -> String {
        cli_level
            .map(str::to_string)
            .or_else(|| self.log_level.clone())
            .unwrap_or_else(|| notekeep_core::default_log_level().to_string())
    }

    /// Precedence: CLI `--log-dir`, config `log_dir`, `<data dir>/logs`.
    ///
    /// Relative paths are resolved against the working directory because the
    /// logger only accepts absolute directories.
    pub fn log_dir(&self, cli_dir: Option<&PathBuf>) -> Result<PathBuf> {
        let dir = cli_dir
            .cloned()
            .or_else(|| self.log_dir.clone())
            .unwrap_or_else(|| data_dir().join("logs"));
        if dir.is_absolute() {
            return Ok(dir);
        }
        let cwd = std::env::current_dir().context("failed to resolve working directory")?;
        Ok(cwd.join(dir))
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
