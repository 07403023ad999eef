//! Runtime configuration. Every setting has a sensible default and can be
//! overridden through environment variables, which keeps the binary free of
//! flags while still letting tests and power users point it elsewhere.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".music-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "music.db";
/// Log file written next to the database while the terminal UI is running.
const LOG_FILE_NAME: &str = "catalog.log";
/// Upper bound for every catalog read.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

pub const DB_PATH_VAR: &str = "MUSIC_CATALOG_DB";
pub const SCRIPT_PATH_VAR: &str = "MUSIC_CATALOG_SCRIPT";
pub const QUERY_TIMEOUT_VAR: &str = "MUSIC_CATALOG_QUERY_TIMEOUT_SECS";

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Private in-memory store; contents vanish when the handle is closed.
    Memory,
}

impl StoreLocation {
    pub fn describe(&self) -> String {
        match self {
            StoreLocation::File(path) => path.display().to_string(),
            StoreLocation::Memory => ":memory:".to_string(),
        }
    }
}

/// Which script seeds an empty store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// The script compiled into the binary.
    Bundled,
    /// A script read from disk at bootstrap time.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub store: StoreLocation,
    pub script: ScriptSource,
    pub query_timeout: Duration,
}

impl CatalogConfig {
    /// Configuration for a throwaway in-memory catalog seeded from the bundled
    /// script.
    pub fn in_memory() -> Self {
        Self {
            store: StoreLocation::Memory,
            script: ScriptSource::Bundled,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Configuration for an on-disk catalog at `path`.
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreLocation::File(path.into()),
            ..Self::in_memory()
        }
    }

    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match non_empty(lookup(DB_PATH_VAR)) {
            Some(path) => StoreLocation::File(PathBuf::from(path)),
            None => StoreLocation::File(default_db_path()?),
        };

        let script = match non_empty(lookup(SCRIPT_PATH_VAR)) {
            Some(path) => ScriptSource::File(PathBuf::from(path)),
            None => ScriptSource::Bundled,
        };

        let query_timeout = match non_empty(lookup(QUERY_TIMEOUT_VAR)) {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("{QUERY_TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"))?;
                if secs == 0 {
                    return Err(anyhow!("{QUERY_TIMEOUT_VAR} must be at least 1 second."));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_QUERY_TIMEOUT,
        };

        Ok(Self {
            store,
            script,
            query_timeout,
        })
    }

    /// Log file path beside the database, or in the working directory for
    /// in-memory stores.
    pub fn log_path(&self) -> PathBuf {
        match &self.store {
            StoreLocation::File(path) => path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(LOG_FILE_NAME),
            StoreLocation::Memory => PathBuf::from(LOG_FILE_NAME),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
