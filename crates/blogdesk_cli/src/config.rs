//! Runtime configuration for the CLI.
//!
//! Values resolve in order: command-line flags, `BLOGDESK_*` environment
//! variables, built-in defaults.

use blogdesk_core::default_log_level;
use std::path::PathBuf;

pub const ENV_DB: &str = "BLOGDESK_DB";
pub const ENV_OUT_DIR: &str = "BLOGDESK_OUT_DIR";
pub const ENV_LOG_DIR: &str = "BLOGDESK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "BLOGDESK_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "blogdesk.sqlite3";
const DEFAULT_OUT_DIR: &str = "site";

/// Flag values as given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFlags {
    pub db: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Use a process-local store instead of the SQLite slot.
    pub memory: bool,
}

/// Where articles are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    File(PathBuf),
    Memory,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageTarget,
    /// Directory receiving exported HTML and JSON files.
    pub out_dir: PathBuf,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    /// Resolves flags against the process environment.
    pub fn from_env(flags: &ConfigFlags) -> Self {
        Self::resolve(flags, |key| std::env::var(key).ok())
    }

    /// Resolves flags against an arbitrary variable lookup.
    pub fn resolve<F>(flags: &ConfigFlags, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_path = |key: &str| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        let storage = if flags.memory {
            StorageTarget::Memory
        } else {
            StorageTarget::File(
                flags
                    .db
                    .clone()
                    .or_else(|| env_path(ENV_DB))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME)),
            )
        };

        Self {
            storage,
            out_dir: flags
                .out_dir
                .clone()
                .or_else(|| env_path(ENV_OUT_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            log_dir: flags.log_dir.clone().or_else(|| env_path(ENV_LOG_DIR)),
            log_level: flags
                .log_level
                .clone()
                .or_else(|| env(ENV_LOG_LEVEL))
                .unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}
