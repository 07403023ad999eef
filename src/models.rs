//! Domain models that mirror the SQLite schema. They stay light-weight data
//! holders so the repository and the terminal front end can pass them around
//! freely.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// A performer. Seeded by the bootstrap script and never edited here.
pub struct Artist {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// An album as listed for filters and forms. The `name` column is exposed as
/// `title`.
pub struct Album {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Stored state of a single song, used to pre-fill the edit form.
pub struct Song {
    pub id: i64,
    pub title: String,
    /// Length in seconds.
    pub duration: f64,
    pub album_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
/// One line of the filtered song listing. The id travels with the display
/// fields so a selected row always resolves to the record it shows.
pub struct SongRow {
    pub id: i64,
    pub title: String,
    pub duration: f64,
    pub album_title: String,
    pub artist_name: String,
}

impl SongRow {
    /// `Title | Duration | Album | Artist`, the format used by the song list.
    pub fn display_line(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.title, self.duration, self.album_title, self.artist_name
        )
    }
}

impl fmt::Display for SongRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a song write. Zero affected rows is a soft failure: nothing
/// errored, but nothing changed either.
pub struct WriteOutcome {
    pub kind: WriteKind,
    pub song_id: i64,
    pub affected: usize,
}

impl WriteOutcome {
    pub fn applied(&self) -> bool {
        self.affected > 0
    }

    /// Notification text for the front end.
    pub fn message(&self) -> String {
        match (self.kind, self.applied()) {
            (WriteKind::Create, true) => "Song added.".to_string(),
            (WriteKind::Create, false) => "Could not add the song.".to_string(),
            (WriteKind::Update, true) => "Song updated.".to_string(),
            (WriteKind::Update, false) => "Could not update the song.".to_string(),
            (WriteKind::Delete, true) => "Song deleted.".to_string(),
            (WriteKind::Delete, false) => {
                format!("Song {} was already removed.", self.song_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_joins_all_columns() {
        let row = SongRow {
            id: 3,
            title: "Time".to_string(),
            duration: 413.0,
            album_title: "The Dark Side of the Moon".to_string(),
            artist_name: "Pink Floyd".to_string(),
        };

        assert_eq!(
            row.display_line(),
            "Time | 413 | The Dark Side of the Moon | Pink Floyd"
        );
    }

    #[test]
    fn fractional_durations_are_shown_as_stored() {
        let row = SongRow {
            id: 1,
            title: "Test".to_string(),
            duration: 120.5,
            album_title: "A".to_string(),
            artist_name: "B".to_string(),
        };

        assert_eq!(row.to_string(), "Test | 120.5 | A | B");
    }

    #[test]
    fn soft_failed_delete_reports_the_missing_id() {
        let outcome = WriteOutcome {
            kind: WriteKind::Delete,
            song_id: 42,
            affected: 0,
        };

        assert!(!outcome.applied());
        assert_eq!(outcome.message(), "Song 42 was already removed.");
    }
}
