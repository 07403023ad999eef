//! Persistence module split across logical submodules.

mod bootstrap;
mod catalog;
mod connection;
mod query;
mod songs;
mod timeout;

pub use bootstrap::{
    ensure_initialized, schema_exists, split_statements, BootstrapOutcome, BUNDLED_SCRIPT,
};
pub use catalog::{fetch_albums, fetch_artists};
pub use connection::ConnectionProvider;
pub use query::{build_song_query, SongFilter, SongQuery};
pub use songs::{delete_song, fetch_song, fetch_songs, insert_song, next_song_id, update_song};
pub(crate) use timeout::with_deadline;
