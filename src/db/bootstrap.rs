use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{error, info, warn};
use rusqlite::{Connection, OptionalExtension};

use super::connection::ConnectionProvider;
use crate::config::ScriptSource;
use crate::error::{CatalogError, Result, StoreResultExt};

/// Schema and seed data shipped with the binary.
pub const BUNDLED_SCRIPT: &str = include_str!("../../assets/musicdb.sql");

/// Table whose presence marks the catalog as initialized.
const CANONICAL_TABLE: &str = "song";

/// What `ensure_initialized` did. Failures are reported here rather than as
/// errors so the front end can still start against a degraded store.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The schema already existed.
    Skipped,
    /// Every statement of the script ran.
    Applied { statements: usize },
    /// The override script could not be found; nothing was executed.
    ScriptMissing { path: PathBuf },
    /// Initialization stopped after `applied` statements.
    Failed { applied: usize, error: CatalogError },
}

impl BootstrapOutcome {
    /// Whether the store is usable after this run.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Skipped | Self::Applied { .. })
    }
}

/// Create and seed the schema unless the canonical table already exists.
/// Safe to call repeatedly; only the first call against an empty store does
/// any work.
pub fn ensure_initialized(provider: &mut ConnectionProvider, source: &ScriptSource) -> BootstrapOutcome {
    let conn = match provider.acquire() {
        Ok(conn) => conn,
        Err(err) => {
            error!("Catalog initialization aborted: {err}");
            return BootstrapOutcome::Failed {
                applied: 0,
                error: err,
            };
        }
    };

    match schema_exists(conn) {
        Ok(true) => {
            info!("Catalog already initialized, skipping bootstrap.");
            return BootstrapOutcome::Skipped;
        }
        Ok(false) => {}
        Err(err) => {
            error!("Catalog initialization aborted: {err}");
            return BootstrapOutcome::Failed {
                applied: 0,
                error: err,
            };
        }
    }

    let script = match load_script(source) {
        Ok(script) => script,
        Err(ScriptError::Missing(path)) => {
            error!("Bootstrap script not found at {}", path.display());
            return BootstrapOutcome::ScriptMissing { path };
        }
        Err(ScriptError::Unreadable(err)) => {
            error!("Catalog initialization aborted: {err}");
            return BootstrapOutcome::Failed {
                applied: 0,
                error: err,
            };
        }
    };

    let statements = split_statements(&script);
    let mut applied = 0;
    for statement in &statements {
        if let Err(err) = conn.execute_batch(statement) {
            let error = CatalogError::Initialization {
                message: format!(
                    "statement {} of {} failed: {err}",
                    applied + 1,
                    statements.len()
                ),
            };
            error!("{error}");
            if applied > 0 {
                warn!("Catalog left partially initialized after {applied} statements.");
            }
            return BootstrapOutcome::Failed { applied, error };
        }
        applied += 1;
    }

    info!("Catalog initialized with {applied} statements.");
    BootstrapOutcome::Applied {
        statements: applied,
    }
}

/// Whether the canonical table is present in the store metadata.
pub fn schema_exists(conn: &Connection) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [CANONICAL_TABLE],
            |_| Ok(()),
        )
        .optional()
        .store_context("failed to inspect catalog schema")?;
    Ok(found.is_some())
}

/// Drop blank lines and `--` comment lines, then split on `;` into trimmed,
/// non-empty statements.
pub fn split_statements(script: &str) -> Vec<String> {
    let body: String = script
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .map(|line| format!("{line}\n"))
        .collect();

    body.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .map(str::to_string)
        .collect()
}

enum ScriptError {
    Missing(PathBuf),
    Unreadable(CatalogError),
}

fn load_script(source: &ScriptSource) -> std::result::Result<String, ScriptError> {
    match source {
        ScriptSource::Bundled => Ok(BUNDLED_SCRIPT.to_string()),
        ScriptSource::File(path) => fs::read_to_string(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ScriptError::Missing(path.clone())
            } else {
                ScriptError::Unreadable(CatalogError::Initialization {
                    message: format!("could not read {}: {err}", path.display()),
                })
            }
        }),
    }
}
