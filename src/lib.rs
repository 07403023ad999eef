//! Core library surface for the music catalog TUI.
//!
//! The catalog is a small SQLite store of artists, albums, and songs. The
//! `session` module is the boundary the terminal front end talks to; the
//! lower layers stay public so tests and other tooling can drive the store
//! directly.
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod selection;
pub mod session;
pub mod ui;

/// Startup configuration resolved from the environment.
pub use config::{CatalogConfig, ScriptSource, StoreLocation};

/// Bootstrap and filtering types that callers of the session see.
pub use db::{BootstrapOutcome, SongFilter};

pub use error::{CatalogError, Result};

/// The domain types that other layers manipulate.
pub use models::{Album, Artist, Song, SongRow, WriteKind, WriteOutcome};

pub use repository::CatalogRepository;
pub use session::{CatalogSession, WriteReport};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
