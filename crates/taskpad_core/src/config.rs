//! Data directory layout and environment overrides.
//!
//! # Responsibility
//! - Resolve where the snapshot database, attachment documents and logs live.
//!
//! # Invariants
//! - All derived paths are children of `data_dir`.
//! - `data_dir` is absolute; relative inputs resolve against the working
//!   directory.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Env var overriding the data directory.
pub const DATA_DIR_ENV: &str = "TASKPAD_DATA_DIR";
/// Env var overriding the log level.
pub const LOG_LEVEL_ENV: &str = "TASKPAD_LOG_LEVEL";

const DEFAULT_DIR_NAME: &str = "taskpad";
const DB_FILE_NAME: &str = "taskpad.sqlite3";
const DOCUMENTS_DIR_NAME: &str = "documents";
const LOGS_DIR_NAME: &str = "logs";

/// Core runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl CoreConfig {
    /// Uses `data_dir` with the build-mode default log level.
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: absolutize(data_dir.into()),
            log_level: default_log_level().to_string(),
        }
    }

    /// Reads [`DATA_DIR_ENV`] and [`LOG_LEVEL_ENV`]; blank values fall back
    /// to `<temp_dir>/taskpad` and the default level.
    pub fn from_env() -> Self {
        let data_dir = non_blank_env(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DIR_NAME));
        let mut config = Self::from_data_dir(data_dir);
        if let Some(level) = non_blank_env(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Root under which `tasks/<id>/` attachment directories are created.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_DIR_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOGS_DIR_NAME)
    }
}

fn absolutize(dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        return dir;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(_) => dir,
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
