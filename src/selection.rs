//! Row-index to song-id translation for the displayed song list.

use crate::error::{CatalogError, Result};
use crate::models::SongRow;

/// Holds the rows currently on screen. Each refresh replaces the whole
/// sequence and bumps the generation, so an index taken before a refresh can
/// be told apart from one taken after it.
#[derive(Debug, Default)]
pub struct SelectionMapper {
    rows: Vec<SongRow>,
    generation: u64,
}

impl SelectionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed rows and return the new generation.
    pub fn refresh(&mut self, rows: Vec<SongRow>) -> u64 {
        self.rows = rows;
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rows(&self) -> &[SongRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Song id shown at `index` in the current listing.
    pub fn resolve(&self, index: usize) -> Result<i64> {
        self.row(index).map(|row| row.id)
    }

    /// Like [`resolve`](Self::resolve), but only for an index taken from the
    /// listing identified by `generation`.
    pub fn resolve_in(&self, generation: u64, index: usize) -> Result<i64> {
        if generation != self.generation {
            return Err(CatalogError::RowNotFound {
                index,
                rows: self.rows.len(),
            });
        }
        self.resolve(index)
    }

    pub fn row(&self, index: usize) -> Result<&SongRow> {
        self.rows.get(index).ok_or(CatalogError::RowNotFound {
            index,
            rows: self.rows.len(),
        })
    }
}
