use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Album, Song, SongRow};

/// Form state for adding or editing a song. Title and duration are kept as
/// the raw text the user typed; the catalog session does the validation.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) duration: String,
    /// Index into the album list handed to the form.
    pub(crate) album_index: usize,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum SongField {
    #[default]
    Title,
    Duration,
    Album,
}

impl SongForm {
    /// Populate the form from a stored song when entering edit mode.
    pub(crate) fn from_song(song: &Song, albums: &[Album]) -> Self {
        Self {
            title: song.title.clone(),
            duration: song.duration.to_string(),
            album_index: albums
                .iter()
                .position(|album| album.id == song.album_id)
                .unwrap_or(0),
            active: SongField::Title,
            error: None,
        }
    }

    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Duration,
            SongField::Duration => SongField::Album,
            SongField::Album => SongField::Title,
        };
    }

    /// Cycle focus backwards.
    pub(crate) fn toggle_field_back(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Album,
            SongField::Duration => SongField::Title,
            SongField::Album => SongField::Duration,
        };
    }

    /// Insert a character into the active text field. The album field only
    /// reacts to Left/Right.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Title => self.title.push(ch),
            SongField::Duration => self.duration.push(ch),
            SongField::Album => return false,
        }
        true
    }

    /// Remove a character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            SongField::Title => {
                self.title.pop();
            }
            SongField::Duration => {
                self.duration.pop();
            }
            SongField::Album => {}
        }
    }

    /// Step through the album list, wrapping at both ends.
    pub(crate) fn cycle_album(&mut self, offset: isize, album_count: usize) {
        if album_count == 0 {
            self.album_index = 0;
            return;
        }
        let count = album_count as isize;
        self.album_index = (self.album_index as isize + offset).rem_euclid(count) as usize;
    }

    /// Album currently chosen in the form.
    pub(crate) fn selected_album<'a>(&self, albums: &'a [Album]) -> Option<&'a Album> {
        albums.get(self.album_index)
    }

    /// Render a single field line. The active field is highlighted.
    pub(crate) fn build_line(&self, field: SongField, albums: &[Album]) -> Line<'static> {
        let is_active = self.active == field;
        let (label, value, placeholder) = match field {
            SongField::Title => ("Title", self.title.clone(), "<required>"),
            SongField::Duration => ("Duration (s)", self.duration.clone(), "<required>"),
            SongField::Album => (
                "Album",
                self.selected_album(albums)
                    .map(|album| format!("< {} >", album.title))
                    .unwrap_or_default(),
                "<no albums>",
            ),
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", label)),
            Span::styled(display, style),
        ])
    }

    /// Label prefix width plus value length, used to place the cursor.
    pub(crate) fn cursor_offset(&self) -> Option<(u16, u16)> {
        match self.active {
            SongField::Title => Some((
                ("Title: ".len() + self.title.chars().count()) as u16,
                0,
            )),
            SongField::Duration => Some((
                ("Duration (s): ".len() + self.duration.chars().count()) as u16,
                1,
            )),
            SongField::Album => None,
        }
    }
}

/// State for confirming permanent song deletion. The row index is resolved
/// by the session when the user confirms, against the listing it was taken
/// from.
pub(crate) struct ConfirmSongDelete {
    pub(crate) generation: u64,
    pub(crate) row: usize,
    pub(crate) label: String,
}

impl ConfirmSongDelete {
    pub(crate) fn new(generation: u64, row: usize, song: &SongRow) -> Self {
        Self {
            generation,
            row,
            label: song.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn albums() -> Vec<Album> {
        vec![
            Album {
                id: 1,
                title: "A Night at the Opera".to_string(),
            },
            Album {
                id: 3,
                title: "The Dark Side of the Moon".to_string(),
            },
            Album {
                id: 5,
                title: "OK Computer".to_string(),
            },
        ]
    }

    #[test]
    fn edit_form_is_prefilled_from_the_song() {
        let song = Song {
            id: 9,
            title: "Paranoid Android".to_string(),
            duration: 383.5,
            album_id: 5,
        };
        let form = SongForm::from_song(&song, &albums());

        assert_eq!(form.title, "Paranoid Android");
        assert_eq!(form.duration, "383.5");
        assert_eq!(form.album_index, 2);
        assert_eq!(form.selected_album(&albums()).unwrap().id, 5);
    }

    #[test]
    fn typing_goes_to_the_active_text_field() {
        let mut form = SongForm::default();
        assert!(form.push_char('H'));
        form.toggle_field();
        assert!(form.push_char('9'));
        form.toggle_field();
        assert!(!form.push_char('x'));
        form.toggle_field();
        form.backspace();

        assert_eq!(form.title, "");
        assert_eq!(form.duration, "9");
        assert_eq!(form.active, SongField::Title);
    }

    #[test]
    fn album_cycling_wraps() {
        let mut form = SongForm::default();
        form.cycle_album(-1, 3);
        assert_eq!(form.album_index, 2);
        form.cycle_album(1, 3);
        assert_eq!(form.album_index, 0);
        form.cycle_album(1, 0);
        assert_eq!(form.album_index, 0);
    }

    #[test]
    fn backwards_focus_mirrors_forward_focus() {
        let mut form = SongForm::default();
        form.toggle_field_back();
        assert_eq!(form.active, SongField::Album);
        form.toggle_field_back();
        assert_eq!(form.active, SongField::Duration);
        assert_eq!(form.cursor_offset(), Some((14, 1)));
    }
}
