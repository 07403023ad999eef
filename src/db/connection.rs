use std::fs;
use std::time::Duration;

use log::{error, info};
use rusqlite::Connection;

use crate::config::StoreLocation;
use crate::error::{CatalogError, Result};

/// How long SQLite waits on a locked database file before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the single catalog connection. The handle is opened lazily on the
/// first `acquire`, cached, and reopened if it was closed in between.
pub struct ConnectionProvider {
    location: StoreLocation,
    conn: Option<Connection>,
}

impl ConnectionProvider {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    /// Adopt an already-open handle, e.g. an in-memory store prepared by a
    /// test.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            location: StoreLocation::Memory,
            conn: Some(conn),
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Return the live handle, opening it first if needed.
    pub fn acquire(&mut self) -> Result<&Connection> {
        if self.conn.is_none() {
            let conn = open_store(&self.location).map_err(|err| {
                error!("{err}");
                err
            })?;
            info!("Opened catalog store at {}", self.location.describe());
            self.conn = Some(conn);
        }

        self.conn.as_ref().ok_or_else(|| CatalogError::Connection {
            location: self.location.describe(),
            reason: "connection handle unavailable".to_string(),
        })
    }

    /// Close the cached handle. The next `acquire` opens a fresh one.
    pub fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(conn, err)| {
                self.conn = Some(conn);
                error!("Failed to close catalog store: {err}");
                CatalogError::store("failed to close catalog store", err)
            }),
            None => Ok(()),
        }
    }
}

/// Open the store, creating the parent directory for file-backed catalogs and
/// turning on the pragmas every catalog connection relies on.
fn open_store(location: &StoreLocation) -> Result<Connection> {
    let connection_error = |reason: String| CatalogError::Connection {
        location: location.describe(),
        reason,
    };

    let conn = match location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| {
                    connection_error(format!("failed to create data directory: {err}"))
                })?;
            }
            Connection::open(path)
        }
        StoreLocation::Memory => Connection::open_in_memory(),
    }
    .map_err(|err| connection_error(err.to_string()))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(|err| connection_error(format!("failed to enable foreign keys: {err}")))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|err| connection_error(format!("failed to set busy timeout: {err}")))?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn opens_lazily_and_reuses_the_handle() {
        let mut provider = ConnectionProvider::new(StoreLocation::Memory);
        assert!(!provider.is_open());

        provider
            .acquire()
            .unwrap()
            .execute_batch("CREATE TABLE marker (id INTEGER)")
            .unwrap();
        assert!(provider.is_open());

        // Same handle: the in-memory table is still there.
        let count: i64 = provider
            .acquire()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM marker", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn reopens_after_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("music.db");
        let mut provider = ConnectionProvider::new(StoreLocation::File(path.clone()));

        provider
            .acquire()
            .unwrap()
            .execute_batch("CREATE TABLE marker (id INTEGER); INSERT INTO marker VALUES (7);")
            .unwrap();
        assert!(path.exists());

        provider.close().unwrap();
        assert!(!provider.is_open());

        let value: i64 = provider
            .acquire()
            .unwrap()
            .query_row("SELECT id FROM marker", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let mut provider = ConnectionProvider::new(StoreLocation::Memory);
        let enabled: i64 = provider
            .acquire()
            .unwrap()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn unopenable_store_is_a_connection_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let mut provider = ConnectionProvider::new(StoreLocation::File(dir.path().to_path_buf()));

        let err = provider.acquire().unwrap_err();
        assert!(matches!(err, CatalogError::Connection { .. }));
        assert!(!provider.is_open());
    }
}
