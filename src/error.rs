//! Error types shared by every catalog component.
//!
//! Everything below the terminal front end reports failures through
//! [`CatalogError`]. The variants line up with the user-facing notifications:
//! each one renders as a single sentence that already embeds the low-level
//! cause, so callers can show `err.to_string()` without inspecting it.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The store could not be opened (missing directory, locked file, ...).
    #[error("Could not open the catalog at '{location}': {reason}")]
    Connection { location: String, reason: String },
    /// The bootstrap script was missing or only partially applied.
    #[error("Catalog initialization failed: {message}")]
    Initialization { message: String },
    /// A read ran past the configured query timeout.
    #[error("{operation}: query timed out.")]
    QueryTimeout { operation: String },
    /// A field supplied by the user failed validation.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },
    #[error("Song with ID {id} not found.")]
    SongNotFound { id: i64 },
    /// The selected row does not exist in the current listing.
    #[error("Row {index} is not part of the current song list ({rows} rows).")]
    RowNotFound { index: usize, rows: usize },
    /// Any other failure reported by SQLite.
    #[error("{message}: {source}")]
    Store {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl CatalogError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a SQLite error. Interrupts raised by the query deadline become
    /// [`CatalogError::QueryTimeout`].
    pub fn store(message: impl Into<String>, source: rusqlite::Error) -> Self {
        let message = message.into();
        if matches!(
            source.sqlite_error_code(),
            Some(ErrorCode::OperationInterrupted)
        ) {
            Self::QueryTimeout { operation: message }
        } else {
            Self::Store { message, source }
        }
    }

    /// Whether the failure concerns a record or row that no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SongNotFound { .. } | Self::RowNotFound { .. })
    }
}

/// Map `rusqlite` results into catalog errors with a short context message.
pub trait StoreResultExt<T> {
    fn store_context(self, message: &str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn store_context(self, message: &str) -> Result<T> {
        self.map_err(|err| CatalogError::store(message, err))
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
