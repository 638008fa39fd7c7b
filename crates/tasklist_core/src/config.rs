//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database location and logging settings for hosts (FFI, CLI).
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never touches the file system.

use crate::logging::{default_log_level, init_logging, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TASKLIST_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "TASKLIST_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TASKLIST_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_ENV}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Host configuration for the task store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite file backing the durable key-value store.
    pub db_path: PathBuf,
    /// Normalized log level (`trace|debug|info|warn|error`).
    pub log_level: &'static str,
    /// Rolling log directory. Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration using `lookup` for variable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let db_path = value(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);
        let log_level = match value(LOG_LEVEL_ENV) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };
        let log_dir = value(LOG_DIR_ENV).map(PathBuf::from);

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is disabled by configuration.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(self.log_level, log_dir)?;
        Ok(true)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
