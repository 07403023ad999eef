use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::query::{build_song_query, SongFilter};
use crate::error::{Result, StoreResultExt};
use crate::models::{Song, SongRow};

/// Songs matching `filter`, joined with their album and artist names and
/// ordered by id.
pub fn fetch_songs(conn: &Connection, filter: &SongFilter) -> Result<Vec<SongRow>> {
    let query = build_song_query(filter);
    let mut stmt = conn
        .prepare(&query.sql)
        .store_context("failed to prepare song query")?;

    let songs = stmt
        .query_map(params_from_iter(query.params.iter()), |row| {
            Ok(SongRow {
                id: row.get(0)?,
                title: row.get(1)?,
                duration: row.get(2)?,
                album_title: row.get(3)?,
                artist_name: row.get(4)?,
            })
        })
        .store_context("failed to load songs")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .store_context("failed to load songs")?;

    Ok(songs)
}

/// Stored state of one song, if it exists.
pub fn fetch_song(conn: &Connection, id: i64) -> Result<Option<Song>> {
    conn.query_row(
        "SELECT id, name, duration, album_id FROM song WHERE id = ?1",
        [id],
        |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                duration: row.get(2)?,
                album_id: row.get(3)?,
            })
        },
    )
    .optional()
    .store_context("failed to load song")
}

/// Next song id: one past the current maximum, or 1 for an empty table.
/// Only safe with a single writer.
pub fn next_song_id(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM song", [], |row| {
        row.get(0)
    })
    .store_context("failed to allocate song id")
}

/// Insert a song under an explicit id, returning the affected row count.
pub fn insert_song(
    conn: &Connection,
    id: i64,
    title: &str,
    duration: f64,
    album_id: i64,
) -> Result<usize> {
    conn.execute(
        "INSERT INTO song (id, name, duration, album_id) VALUES (?1, ?2, ?3, ?4)",
        params![id, title, duration, album_id],
    )
    .store_context("failed to insert song")
}

/// Overwrite the editable fields of a song. Zero means the id is gone.
pub fn update_song(
    conn: &Connection,
    id: i64,
    title: &str,
    duration: f64,
    album_id: i64,
) -> Result<usize> {
    conn.execute(
        "UPDATE song SET name = ?1, duration = ?2, album_id = ?3 WHERE id = ?4",
        params![title, duration, album_id, id],
    )
    .store_context("failed to update song")
}

/// Permanently delete a song. Zero means it was already gone.
pub fn delete_song(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM song WHERE id = ?1", params![id])
        .store_context("failed to delete song")
}
