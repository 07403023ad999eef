//! The method-call boundary used by the front end. A session owns the
//! repository, the active song filter, and the selection mapper, so row
//! indices coming from the UI are always resolved against the rows the UI was
//! last given.

use log::{debug, warn};

use crate::config::{CatalogConfig, ScriptSource};
use crate::db::{self, BootstrapOutcome, ConnectionProvider, SongFilter};
use crate::error::{CatalogError, Result};
use crate::models::{Album, Artist, Song, SongRow, WriteOutcome};
use crate::repository::{parse_duration, CatalogRepository};
use crate::selection::SelectionMapper;

/// A committed write together with any failure to re-list the songs after it.
#[derive(Debug)]
pub struct WriteReport {
    pub outcome: WriteOutcome,
    pub refresh_error: Option<CatalogError>,
}

impl WriteReport {
    /// Notification text covering both the write and the re-listing.
    pub fn message(&self) -> String {
        match &self.refresh_error {
            None => self.outcome.message(),
            Some(err) => format!(
                "{} The song list could not be reloaded: {err}",
                self.outcome.message()
            ),
        }
    }
}

pub struct CatalogSession {
    repository: CatalogRepository,
    script: ScriptSource,
    selection: SelectionMapper,
    filter: SongFilter,
}

impl CatalogSession {
    pub fn new(config: &CatalogConfig) -> Self {
        let provider = ConnectionProvider::new(config.store.clone());
        let repository = CatalogRepository::new(provider).with_query_timeout(config.query_timeout);
        Self::with_repository(repository, config.script.clone())
    }

    pub fn with_repository(repository: CatalogRepository, script: ScriptSource) -> Self {
        Self {
            repository,
            script,
            selection: SelectionMapper::new(),
            filter: SongFilter::default(),
        }
    }

    /// Create and seed the schema if needed. Failures are logged and reported
    /// in the outcome; the session stays usable either way.
    pub fn initialize_catalog(&mut self) -> BootstrapOutcome {
        let outcome = db::ensure_initialized(self.repository.provider_mut(), &self.script);
        if !outcome.is_ready() {
            warn!("Continuing with an uninitialized catalog: {outcome:?}");
        }
        outcome
    }

    pub fn fetch_artists(&mut self) -> Result<Vec<Artist>> {
        self.repository.list_artists()
    }

    pub fn fetch_albums(&mut self) -> Result<Vec<Album>> {
        self.repository.list_albums()
    }

    /// Load the songs matching the given filters and make them the current
    /// listing. On failure the listing is emptied rather than left stale.
    pub fn fetch_songs(&mut self, artist_id: Option<i64>, album_id: Option<i64>) -> Result<&[SongRow]> {
        self.filter = SongFilter::new(artist_id, album_id);
        self.refresh()
    }

    /// Re-run the active filter.
    pub fn refresh(&mut self) -> Result<&[SongRow]> {
        match self.repository.list_songs(&self.filter) {
            Ok(rows) => {
                self.selection.refresh(rows);
                Ok(self.selection.rows())
            }
            Err(err) => {
                self.selection.refresh(Vec::new());
                Err(err)
            }
        }
    }

    pub fn rows(&self) -> &[SongRow] {
        self.selection.rows()
    }

    pub fn selection(&self) -> &SelectionMapper {
        &self.selection
    }

    /// Generation of the current listing. Row indices handed back to the
    /// session must come with the generation they were read under.
    pub fn generation(&self) -> u64 {
        self.selection.generation()
    }

    pub fn filter(&self) -> SongFilter {
        self.filter
    }

    /// Stored state of the song at `row`, for pre-filling the edit form.
    pub fn song_for_edit(&mut self, generation: u64, row: usize) -> Result<Song> {
        let song_id = self.selection.resolve_in(generation, row)?;
        self.repository.load_song(song_id)
    }

    pub fn add_song(&mut self, title: &str, duration_text: &str, album_id: i64) -> Result<WriteReport> {
        let duration = parse_duration(duration_text)?;
        let outcome = self.repository.create_song(title, duration, album_id)?;
        Ok(self.after_write(outcome))
    }

    pub fn update_song(
        &mut self,
        generation: u64,
        row: usize,
        title: &str,
        duration_text: &str,
        album_id: i64,
    ) -> Result<WriteReport> {
        let song_id = self.selection.resolve_in(generation, row)?;
        let duration = parse_duration(duration_text)?;
        let outcome = self
            .repository
            .update_song(song_id, title, duration, album_id)?;
        Ok(self.after_write(outcome))
    }

    pub fn delete_song(&mut self, generation: u64, row: usize) -> Result<WriteReport> {
        let song_id = self.selection.resolve_in(generation, row)?;
        let outcome = self.repository.delete_song(song_id)?;
        Ok(self.after_write(outcome))
    }

    /// The write has already been committed at this point, so a failed
    /// re-listing is reported next to the outcome instead of replacing it.
    fn after_write(&mut self, outcome: WriteOutcome) -> WriteReport {
        debug!("{}", outcome.message());
        let refresh_error = self.refresh().err();
        if let Some(err) = &refresh_error {
            warn!("{} Reloading the song list failed: {err}", outcome.message());
        }
        WriteReport {
            outcome,
            refresh_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn seeded_session() -> CatalogSession {
        let mut session = CatalogSession::new(&CatalogConfig::in_memory());
        assert!(session.initialize_catalog().is_ready());
        session
    }

    #[test]
    fn fetch_songs_rebuilds_the_selection() {
        let mut session = seeded_session();

        let ids: Vec<i64> = session
            .fetch_songs(Some(2), None)
            .unwrap()
            .iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(ids, vec![5, 6, 7, 8]);
        assert_eq!(session.selection().resolve(2).unwrap(), 7);

        session.fetch_songs(None, Some(5)).unwrap();
        assert_eq!(session.selection().len(), 2);
        assert_eq!(session.selection().resolve(0).unwrap(), 9);
        assert!(session.selection().resolve(2).is_err());
    }

    #[test]
    fn writes_refresh_with_the_active_filter() {
        let mut session = seeded_session();
        session.fetch_songs(Some(3), None).unwrap();
        assert_eq!(session.rows().len(), 2);

        let report = session.add_song("No Surprises", "229", 5).unwrap();
        assert!(report.outcome.applied());
        assert!(report.refresh_error.is_none());
        assert_eq!(session.filter(), SongFilter::new(Some(3), None));
        let titles: Vec<&str> = session.rows().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Paranoid Android", "Karma Police", "No Surprises"]);
    }

    #[test]
    fn edit_prefill_and_update_go_through_the_row() {
        let mut session = seeded_session();
        session.fetch_songs(None, Some(1)).unwrap();
        let generation = session.generation();

        let song = session.song_for_edit(generation, 1).unwrap();
        assert_eq!(song.title, "Love of My Life");
        assert_eq!(song.album_id, 1);

        session
            .update_song(generation, 1, "Love of My Life (Live)", "240", 1)
            .unwrap();
        assert_eq!(session.rows()[1].title, "Love of My Life (Live)");
        assert_eq!(session.rows()[1].duration, 240.0);
    }

    #[test]
    fn out_of_range_rows_are_not_found() {
        let mut session = seeded_session();
        session.fetch_songs(Some(1), Some(2)).unwrap();
        let generation = session.generation();

        assert!(session.delete_song(generation, 2).unwrap_err().is_not_found());
        assert!(matches!(
            session.update_song(generation, 9, "X", "1", 1),
            Err(CatalogError::RowNotFound { index: 9, rows: 2 })
        ));
        assert_eq!(session.rows().len(), 2);
    }

    #[test]
    fn indices_from_an_earlier_listing_are_rejected() {
        let mut session = seeded_session();
        session.fetch_songs(None, None).unwrap();
        let unfiltered = session.generation();
        assert_eq!(session.rows()[3].id, 4);

        // Row 3 of the Pink Floyd listing is song 8, not song 4.
        session.fetch_songs(Some(2), None).unwrap();
        assert!(session.delete_song(unfiltered, 3).unwrap_err().is_not_found());
        assert!(session.song_for_edit(unfiltered, 3).unwrap_err().is_not_found());
        assert!(session
            .update_song(unfiltered, 3, "Wish You Were Here", "334", 4)
            .unwrap_err()
            .is_not_found());

        let ids: Vec<i64> = session.rows().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![5, 6, 7, 8]);
        session.fetch_songs(None, None).unwrap();
        assert_eq!(session.rows().len(), 10);
    }

    #[test]
    fn each_write_starts_a_new_listing() {
        let mut session = seeded_session();
        session.fetch_songs(None, None).unwrap();
        let before = session.generation();

        session.delete_song(before, 0).unwrap();
        assert_ne!(session.generation(), before);
        assert!(session.delete_song(before, 0).unwrap_err().is_not_found());
        assert_eq!(session.rows().len(), 9);
    }

    #[test]
    fn committed_write_survives_a_failed_reload() {
        let mut provider = ConnectionProvider::new(crate::config::StoreLocation::Memory);
        assert!(db::ensure_initialized(&mut provider, &ScriptSource::Bundled).is_ready());
        provider
            .acquire()
            .unwrap()
            .execute_batch(
                "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 5000)
                 INSERT INTO song (id, name, duration, album_id) SELECT x + 100, 'Filler', 1.0, 1 FROM n;",
            )
            .unwrap();
        let repository = CatalogRepository::new(provider).with_query_timeout(Duration::ZERO);
        let mut session = CatalogSession::with_repository(repository, ScriptSource::Bundled);

        let report = session.add_song("Dup", "10", 1).unwrap();
        assert!(report.outcome.applied());
        assert!(matches!(
            report.refresh_error,
            Some(CatalogError::QueryTimeout { .. })
        ));
        assert!(report.message().starts_with("Song added. "));
        assert!(session.selection().is_empty());

        let stored: i64 = session
            .repository
            .provider_mut()
            .acquire()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM song WHERE name = 'Dup'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn failed_listing_clears_the_selection() {
        let mut session = CatalogSession::new(&CatalogConfig::in_memory());
        // No bootstrap: the song table does not exist.
        assert!(session.fetch_songs(None, None).is_err());
        assert!(session.selection().is_empty());
        let generation = session.generation();
        assert!(session.delete_song(generation, 0).unwrap_err().is_not_found());
    }
}
