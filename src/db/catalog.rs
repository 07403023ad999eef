use rusqlite::Connection;

use crate::error::{Result, StoreResultExt};
use crate::models::{Album, Artist};

/// Every artist in store order. Feeds the artist filter picker.
pub fn fetch_artists(conn: &Connection) -> Result<Vec<Artist>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM artist")
        .store_context("failed to prepare artist query")?;

    let artists = stmt
        .query_map([], |row| {
            Ok(Artist {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .store_context("failed to load artists")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .store_context("failed to load artists")?;

    Ok(artists)
}

/// Every album in store order, with `name` exposed as the title.
pub fn fetch_albums(conn: &Connection) -> Result<Vec<Album>> {
    let mut stmt = conn
        .prepare("SELECT id, name AS title FROM album")
        .store_context("failed to prepare album query")?;

    let albums = stmt
        .query_map([], |row| {
            Ok(Album {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })
        .store_context("failed to load albums")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .store_context("failed to load albums")?;

    Ok(albums)
}
