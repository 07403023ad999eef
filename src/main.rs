//! Binary entry point that glues the SQLite-backed catalog to the TUI. We
//! resolve the configuration, start logging to a file (the terminal belongs to
//! the UI), bring up the catalog, and drive the Ratatui event loop until the
//! user exits.
use std::fs::{self, File};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{info, warn};
use music_catalog::{run_app, App, CatalogConfig, CatalogSession};

/// Initialize persistence and launch the Ratatui event loop.
///
/// Only configuration and logging problems are fatal. A catalog that fails to
/// bootstrap still opens, with the failure shown in the footer.
fn main() -> Result<()> {
    let config = CatalogConfig::from_env()?;
    init_logging(&config)?;
    info!("music catalog started against {}", config.store.describe());

    let mut session = CatalogSession::new(&config);
    let outcome = session.initialize_catalog();
    if !outcome.is_ready() {
        warn!("catalog not ready after bootstrap");
    }

    let mut app = App::new(session);
    let result = run_app(&mut app);
    info!("music catalog stopped");
    result
}

fn init_logging(config: &CatalogConfig) -> Result<()> {
    let log_path = config.log_path();
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = File::create(&log_path)
        .with_context(|| format!("failed to create log file {}", log_path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
