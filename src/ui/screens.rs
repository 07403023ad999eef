use crate::models::{Album, Artist};

/// One entry of a filter picker. The leading "all" entry carries no id.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterOption {
    pub(crate) id: Option<i64>,
    pub(crate) label: String,
}

/// A cycling selector over filter options, starting at the "all" sentinel.
#[derive(Debug, Clone)]
pub(crate) struct FilterPicker {
    pub(crate) options: Vec<FilterOption>,
    pub(crate) selected: usize,
}

impl FilterPicker {
    fn with_sentinel(label: &str, entries: impl Iterator<Item = (i64, String)>) -> Self {
        let mut options = vec![FilterOption {
            id: None,
            label: label.to_string(),
        }];
        options.extend(entries.map(|(id, label)| FilterOption {
            id: Some(id),
            label,
        }));
        Self {
            options,
            selected: 0,
        }
    }

    pub(crate) fn artists(artists: &[Artist]) -> Self {
        Self::with_sentinel(
            "All artists",
            artists.iter().map(|artist| (artist.id, artist.name.clone())),
        )
    }

    pub(crate) fn albums(albums: &[Album]) -> Self {
        Self::with_sentinel(
            "All albums",
            albums.iter().map(|album| (album.id, album.title.clone())),
        )
    }

    /// Rebuild the options while keeping the previously selected id when it
    /// still exists.
    pub(crate) fn replace(&mut self, fresh: FilterPicker) {
        let current = self.selected_id();
        self.options = fresh.options;
        self.selected = self
            .options
            .iter()
            .position(|option| option.id == current)
            .unwrap_or(0);
    }

    pub(crate) fn selected_id(&self) -> Option<i64> {
        self.options.get(self.selected).and_then(|option| option.id)
    }

    pub(crate) fn selected_label(&self) -> &str {
        self.options
            .get(self.selected)
            .map(|option| option.label.as_str())
            .unwrap_or("")
    }

    /// Move through the options, wrapping at both ends.
    pub(crate) fn cycle(&mut self, offset: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        self.selected = (self.selected as isize + offset).rem_euclid(len) as usize;
    }
}

/// Which part of the main screen receives Left/Right and Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Artist,
    Album,
    Songs,
}

impl Focus {
    pub(crate) fn next(self) -> Self {
        match self {
            Focus::Artist => Focus::Album,
            Focus::Album => Focus::Songs,
            Focus::Songs => Focus::Artist,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            Focus::Artist => Focus::Songs,
            Focus::Album => Focus::Artist,
            Focus::Songs => Focus::Album,
        }
    }
}

/// Cursor over the displayed song rows.
#[derive(Debug, Default)]
pub(crate) struct SongListState {
    pub(crate) selected: usize,
}

impl SongListState {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the cursor on a valid row after the listing changed size.
    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artists() -> Vec<Artist> {
        vec![
            Artist {
                id: 1,
                name: "Queen".to_string(),
            },
            Artist {
                id: 2,
                name: "Pink Floyd".to_string(),
            },
        ]
    }

    #[test]
    fn picker_starts_on_the_sentinel() {
        let picker = FilterPicker::artists(&artists());

        assert_eq!(picker.options.len(), 3);
        assert_eq!(picker.selected_id(), None);
        assert_eq!(picker.selected_label(), "All artists");
    }

    #[test]
    fn picker_cycles_through_ids() {
        let mut picker = FilterPicker::artists(&artists());
        picker.cycle(1);
        assert_eq!(picker.selected_id(), Some(1));
        picker.cycle(1);
        assert_eq!(picker.selected_label(), "Pink Floyd");
        picker.cycle(1);
        assert_eq!(picker.selected_id(), None);
        picker.cycle(-1);
        assert_eq!(picker.selected_id(), Some(2));
    }

    #[test]
    fn replace_keeps_the_selected_id() {
        let mut picker = FilterPicker::artists(&artists());
        picker.cycle(2);

        let mut reordered = artists();
        reordered.reverse();
        picker.replace(FilterPicker::artists(&reordered));
        assert_eq!(picker.selected_id(), Some(2));
        assert_eq!(picker.selected, 1);

        picker.replace(FilterPicker::artists(&reordered[1..]));
        assert_eq!(picker.selected_id(), None);
    }

    #[test]
    fn list_cursor_is_clamped() {
        let mut list = SongListState::default();
        list.move_selection(5, 3);
        assert_eq!(list.selected, 2);
        list.move_selection(-10, 3);
        assert_eq!(list.selected, 0);

        list.select_last(4);
        list.ensure_in_bounds(2);
        assert_eq!(list.selected, 1);
        list.ensure_in_bounds(0);
        assert_eq!(list.selected, 0);
    }
}
