//! The catalog repository: every read and write the application performs,
//! with input validation in front of the store and store failures turned into
//! [`CatalogError`] values. All access goes through one
//! [`ConnectionProvider`].

use std::collections::HashSet;
use std::time::Duration;

use log::{debug, error};

use crate::config::DEFAULT_QUERY_TIMEOUT;
use crate::db::{self, ConnectionProvider, SongFilter};
use crate::error::{CatalogError, Result};
use crate::models::{Album, Artist, Song, SongRow, WriteKind, WriteOutcome};

pub struct CatalogRepository {
    provider: ConnectionProvider,
    query_timeout: Duration,
    /// Album ids from the most recent `list_albums`; `None` until then.
    known_albums: Option<HashSet<i64>>,
}

impl CatalogRepository {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self {
            provider,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            known_albums: None,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn provider_mut(&mut self) -> &mut ConnectionProvider {
        &mut self.provider
    }

    pub fn list_artists(&mut self) -> Result<Vec<Artist>> {
        let timeout = self.query_timeout;
        let conn = self.provider.acquire()?;
        db::with_deadline(conn, timeout, db::fetch_artists).map_err(log_failure)
    }

    /// List albums and remember their ids as valid song targets.
    pub fn list_albums(&mut self) -> Result<Vec<Album>> {
        let timeout = self.query_timeout;
        let conn = self.provider.acquire()?;
        let albums = db::with_deadline(conn, timeout, db::fetch_albums).map_err(log_failure)?;
        self.known_albums = Some(albums.iter().map(|album| album.id).collect());
        Ok(albums)
    }

    pub fn list_songs(&mut self, filter: &SongFilter) -> Result<Vec<SongRow>> {
        let timeout = self.query_timeout;
        let conn = self.provider.acquire()?;
        db::with_deadline(conn, timeout, |conn| db::fetch_songs(conn, filter)).map_err(log_failure)
    }

    /// Current state of a song, for pre-filling an edit form.
    pub fn load_song(&mut self, song_id: i64) -> Result<Song> {
        let conn = self.provider.acquire()?;
        db::fetch_song(conn, song_id)
            .map_err(log_failure)?
            .ok_or(CatalogError::SongNotFound { id: song_id })
    }

    /// Validate and insert a new song under the next free id.
    pub fn create_song(&mut self, title: &str, duration: f64, album_id: i64) -> Result<WriteOutcome> {
        let title = validate_title(title)?;
        validate_duration(duration)?;
        self.validate_album(album_id)?;

        let conn = self.provider.acquire()?;
        let id = db::next_song_id(conn).map_err(log_failure)?;
        let affected = db::insert_song(conn, id, title, duration, album_id).map_err(log_failure)?;

        let outcome = WriteOutcome {
            kind: WriteKind::Create,
            song_id: id,
            affected,
        };
        debug!("create song {id}: {} row(s)", outcome.affected);
        Ok(outcome)
    }

    /// Validate and overwrite title, duration, and album of an existing song.
    pub fn update_song(
        &mut self,
        song_id: i64,
        title: &str,
        duration: f64,
        album_id: i64,
    ) -> Result<WriteOutcome> {
        let title = validate_title(title)?;
        validate_duration(duration)?;
        self.validate_album(album_id)?;

        let current = self.load_song(song_id)?;
        debug!(
            "updating song {}: '{}' ({}s, album {}) -> '{title}' ({duration}s, album {album_id})",
            current.id, current.title, current.duration, current.album_id
        );

        let conn = self.provider.acquire()?;
        let affected = db::update_song(conn, song_id, title, duration, album_id).map_err(log_failure)?;
        if affected == 0 {
            return Err(CatalogError::SongNotFound { id: song_id });
        }

        Ok(WriteOutcome {
            kind: WriteKind::Update,
            song_id,
            affected,
        })
    }

    /// Delete a song. A missing id is a soft failure with zero affected rows.
    pub fn delete_song(&mut self, song_id: i64) -> Result<WriteOutcome> {
        let conn = self.provider.acquire()?;
        let affected = db::delete_song(conn, song_id).map_err(log_failure)?;
        debug!("delete song {song_id}: {affected} row(s)");

        Ok(WriteOutcome {
            kind: WriteKind::Delete,
            song_id,
            affected,
        })
    }

    fn validate_album(&mut self, album_id: i64) -> Result<()> {
        if self.known_albums.is_none() {
            self.list_albums()?;
        }
        let known = self
            .known_albums
            .as_ref()
            .is_some_and(|albums| albums.contains(&album_id));
        if known {
            Ok(())
        } else {
            Err(CatalogError::validation(
                "album",
                format!("album {album_id} is not in the catalog"),
            ))
        }
    }
}

fn log_failure(err: CatalogError) -> CatalogError {
    error!("{err}");
    err
}

fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        Err(CatalogError::validation("title", "a song title is required"))
    } else {
        Ok(title)
    }
}

fn validate_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() {
        Err(CatalogError::validation("duration", "must be a number"))
    } else if duration < 0.0 {
        Err(CatalogError::validation("duration", "cannot be negative"))
    } else {
        Ok(())
    }
}

/// Parse user-entered duration text into seconds.
pub fn parse_duration(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation("duration", "a duration is required"));
    }
    let duration = trimmed.parse::<f64>().map_err(|_| {
        CatalogError::validation("duration", format!("'{trimmed}' is not a number"))
    })?;
    validate_duration(duration)?;
    Ok(duration)
}
