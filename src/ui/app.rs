use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::error::CatalogError;
use crate::models::Album;
use crate::session::{CatalogSession, WriteReport};

use super::forms::{ConfirmSongDelete, SongField, SongForm};
use super::helpers::{centered_rect, surface_error};
use super::screens::{FilterPicker, Focus, SongListState};

/// Height of the filter bar at the top of the screen.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_SIZE: isize = 5;

/// Fine-grained modes layered over the main screen.
enum Mode {
    Normal,
    AddingSong(SongForm),
    EditingSong { target: EditTarget, form: SongForm },
    ConfirmSongDelete(ConfirmSongDelete),
}

/// The listing generation and row index an edit form was opened from.
#[derive(Clone, Copy)]
struct EditTarget {
    generation: u64,
    row: usize,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the terminal front end. All catalog data
/// comes from the session; the app only keeps what it needs to draw and to
/// translate key presses into session calls.
pub struct App {
    session: CatalogSession,
    albums: Vec<Album>,
    artist_filter: FilterPicker,
    album_filter: FilterPicker,
    list: SongListState,
    focus: Focus,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app and load artists, albums, and the unfiltered song list.
    /// Load failures end up in the footer instead of aborting startup.
    pub fn new(session: CatalogSession) -> Self {
        let mut app = Self {
            session,
            albums: Vec::new(),
            artist_filter: FilterPicker::artists(&[]),
            album_filter: FilterPicker::albums(&[]),
            list: SongListState::default(),
            focus: Focus::Songs,
            mode: Mode::Normal,
            status: None,
        };
        app.reload_all();
        app
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingSong(form) => self.handle_song_form(code, None, form),
            Mode::EditingSong { target, form } => self.handle_song_form(code, Some(target), form),
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Left => self.change_filter(-1),
            KeyCode::Right => self.change_filter(1),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_SIZE),
            KeyCode::PageDown => self.move_selection(PAGE_SIZE),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(self.session.rows().len()),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                self.reload_all();
            }
            KeyCode::Char('+') => {
                if self.albums.is_empty() {
                    self.set_status("No albums available to add a song to.", StatusKind::Error);
                } else {
                    self.clear_status();
                    return Mode::AddingSong(self.new_song_form());
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => return self.open_editor(),
            KeyCode::Enter => {
                if self.focus == Focus::Songs {
                    return self.open_editor();
                }
                self.focus = Focus::Songs;
            }
            KeyCode::Char('-') => {
                let selected = self.list.selected;
                let generation = self.session.generation();
                let confirm = self
                    .session
                    .rows()
                    .get(selected)
                    .map(|row| ConfirmSongDelete::new(generation, selected, row));
                match confirm {
                    Some(confirm) => {
                        self.clear_status();
                        return Mode::ConfirmSongDelete(confirm);
                    }
                    None => self.set_status("No song selected to delete.", StatusKind::Error),
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_song_form(&mut self, code: KeyCode, target: Option<EditTarget>, mut form: SongForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if target.is_some() {
                    "Edit cancelled."
                } else {
                    "Add song cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::BackTab | KeyCode::Up => form.toggle_field_back(),
            KeyCode::Left if form.active == SongField::Album => {
                form.cycle_album(-1, self.albums.len());
            }
            KeyCode::Right if form.active == SongField::Album => {
                form.cycle_album(1, self.albums.len());
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit_song_form(target, &form) {
                Ok(report) if report.outcome.applied() => {
                    // Committed, so the form closes even if the reload failed.
                    self.select_song(report.outcome.song_id);
                    let kind = match report.refresh_error {
                        None => StatusKind::Info,
                        Some(_) => StatusKind::Error,
                    };
                    self.set_status(report.message(), kind);
                    keep_open = false;
                }
                Ok(report) => {
                    let message = report.message();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    if err.is_not_found() {
                        self.list.ensure_in_bounds(self.session.rows().len());
                        keep_open = false;
                    }
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match (keep_open, target) {
            (false, _) => Mode::Normal,
            (true, Some(target)) => Mode::EditingSong { target, form },
            (true, None) => Mode::AddingSong(form),
        }
    }

    fn handle_confirm_song_delete(&mut self, code: KeyCode, confirm: ConfirmSongDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.session.delete_song(confirm.generation, confirm.row) {
                    Ok(report) => {
                        let kind = if report.outcome.applied() && report.refresh_error.is_none() {
                            StatusKind::Info
                        } else {
                            StatusKind::Error
                        };
                        self.set_status(report.message(), kind);
                    }
                    Err(err) => self.report(&err),
                }
                self.list.ensure_in_bounds(self.session.rows().len());
                Mode::Normal
            }
            _ => Mode::ConfirmSongDelete(confirm),
        }
    }

    fn submit_song_form(
        &mut self,
        target: Option<EditTarget>,
        form: &SongForm,
    ) -> Result<WriteReport, CatalogError> {
        let album_id = form
            .selected_album(&self.albums)
            .map(|album| album.id)
            .ok_or_else(|| CatalogError::validation("album", "choose an album"))?;

        match target {
            Some(EditTarget { generation, row }) => {
                self.session
                    .update_song(generation, row, &form.title, &form.duration, album_id)
            }
            None => self.session.add_song(&form.title, &form.duration, album_id),
        }
    }

    /// Start a blank form, preselecting the album filter's album if one is
    /// active.
    fn new_song_form(&self) -> SongForm {
        let mut form = SongForm::default();
        if let Some(album_id) = self.album_filter.selected_id() {
            if let Some(index) = self.albums.iter().position(|album| album.id == album_id) {
                form.album_index = index;
            }
        }
        form
    }

    fn open_editor(&mut self) -> Mode {
        let row = self.list.selected;
        if self.session.rows().is_empty() {
            self.set_status("No song selected to edit.", StatusKind::Error);
            return Mode::Normal;
        }

        let generation = self.session.generation();
        match self.session.song_for_edit(generation, row) {
            Ok(song) => {
                self.clear_status();
                Mode::EditingSong {
                    target: EditTarget { generation, row },
                    form: SongForm::from_song(&song, &self.albums),
                }
            }
            Err(err) => {
                self.report(&err);
                Mode::Normal
            }
        }
    }

    fn change_filter(&mut self, offset: isize) {
        match self.focus {
            Focus::Artist => self.artist_filter.cycle(offset),
            Focus::Album => self.album_filter.cycle(offset),
            Focus::Songs => return,
        }
        self.clear_status();
        self.list.select_first();
        self.reload_songs();
    }

    fn move_selection(&mut self, offset: isize) {
        let len = self.session.rows().len();
        self.list.move_selection(offset, len);
    }

    /// Put the cursor on `song_id` if it is part of the current listing.
    fn select_song(&mut self, song_id: i64) {
        let rows = self.session.rows();
        match rows.iter().position(|row| row.id == song_id) {
            Some(index) => self.list.selected = index,
            None => self.list.ensure_in_bounds(rows.len()),
        }
    }

    /// Reload filter options and songs, keeping the current filter choices.
    fn reload_all(&mut self) {
        match self.session.fetch_artists() {
            Ok(artists) => self.artist_filter.replace(FilterPicker::artists(&artists)),
            Err(err) => {
                self.report(&err);
                return;
            }
        }

        match self.session.fetch_albums() {
            Ok(albums) => {
                self.album_filter.replace(FilterPicker::albums(&albums));
                self.albums = albums;
            }
            Err(err) => {
                self.report(&err);
                return;
            }
        }

        self.reload_songs();
    }

    fn reload_songs(&mut self) {
        let artist_id = self.artist_filter.selected_id();
        let album_id = self.album_filter.selected_id();
        let loaded = self
            .session
            .fetch_songs(artist_id, album_id)
            .map(|rows| rows.len());

        match loaded {
            Ok(len) => self.list.ensure_in_bounds(len),
            Err(err) => {
                self.list.ensure_in_bounds(0);
                self.report(&err);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_filters(frame, chunks[0]);
        self.draw_song_list(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingSong(form) => self.draw_song_form(frame, area, "Add Song", form),
            Mode::EditingSong { form, .. } => self.draw_song_form(frame, area, "Edit Song", form),
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let pickers = [
            ("Artist", &self.artist_filter, Focus::Artist),
            ("Album", &self.album_filter, Focus::Album),
        ];
        for ((title, picker, focus), column) in pickers.into_iter().zip(columns.iter()) {
            let focused = self.focus == focus;
            let border_style = if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let text = if focused {
                format!("< {} >", picker.selected_label())
            } else {
                picker.selected_label().to_string()
            };
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border_style)
                        .title(title),
                );
            frame.render_widget(paragraph, *column);
        }
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect) {
        let rows = self.session.rows();
        let focused = self.focus == Focus::Songs;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            })
            .title(format!("Songs ({})", rows.len()));

        if rows.is_empty() {
            let message = if self.session.filter().is_empty() {
                "No songs yet. Press '+' to add one."
            } else {
                "No songs match the current filters."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| ListItem::new(row.display_line()))
            .collect();
        let highlight = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::AddingSong(_) | Mode::EditingSong { .. } => &[
                ("[Tab]", " Next Field   "),
                ("[←→]", " Album   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::ConfirmSongDelete(_) => &[("[y]", " Delete   "), ("[n]", " Keep")],
            Mode::Normal => &[
                ("[Tab]", " Focus   "),
                ("[←→]", " Filter   "),
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SongForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(SongField::Title, &self.albums),
            form.build_line(SongField::Duration, &self.albums),
            form.build_line(SongField::Album, &self.albums),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • ←→ to pick the album • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some((dx, dy)) = form.cursor_offset() {
            frame.set_cursor_position((inner.x + dx, inner.y + dy));
        }
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}' permanently?", confirm.label)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn report(&mut self, err: &CatalogError) {
        self.set_status(surface_error(err), StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
