use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::types::Note;
use crate::sync::{AppStore, DataOrigin, ListSnapshot};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput, TagPicker, TagPickerEvent};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{NoteDetailView, NoteFormView};
use crate::ui::{ensure_valid_selection, tag_color, truncate};

/// The paginated, searchable, tag-filtered note listing.
pub struct NoteListView {
  list_state: ListState,
  search: SearchInput,
  tag_picker: TagPicker,
  started: bool,
}

impl NoteListView {
  pub fn new() -> Self {
    Self {
      list_state: ListState::default(),
      search: SearchInput::new(),
      tag_picker: TagPicker::new(),
      started: false,
    }
  }

  fn notes(store: &AppStore) -> Vec<Note> {
    match store.list_snapshot() {
      ListSnapshot::Ready { page, .. } => page.notes,
      _ => Vec::new(),
    }
  }

  fn title(&self, store: &AppStore) -> String {
    let filter = match store.tag() {
      Some(tag) => format!(" [{}]", tag),
      None => String::new(),
    };
    let search = store.raw_search();
    let search = if search.is_empty() {
      String::new()
    } else {
      format!(" /{}", search)
    };

    match store.list_snapshot() {
      ListSnapshot::Loading => format!(" Notes{}{} (loading...) ", filter, search),
      ListSnapshot::Failed(error) => format!(" Notes{}{} (error: {}) ", filter, search, error),
      ListSnapshot::Ready { page, origin } => {
        let state = match origin {
          DataOrigin::Fresh => "",
          DataOrigin::Revalidating => " ~",
          DataOrigin::Previous => " (loading...)",
        };
        format!(
          " Notes{}{} {}/{}{} ",
          filter,
          search,
          store.page(),
          page.total_pages.max(1),
          state
        )
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect, store: &AppStore) {
    let snapshot = store.list_snapshot();
    let notes = Self::notes(store);
    ensure_valid_selection(&mut self.list_state, notes.len());

    let block = Block::default()
      .title(self.title(store))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if notes.is_empty() {
      let content = match &snapshot {
        ListSnapshot::Loading => "Loading notes...",
        ListSnapshot::Failed(_) => "Failed to load notes. Press 'r' to retry.",
        ListSnapshot::Ready { .. } => "Nothing found.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = notes
      .iter()
      .map(|note| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<10}", note.tag),
            Style::default().fg(tag_color(note.tag)),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<32}", truncate(&note.title, 32)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            note.created_at.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::raw(truncate(&note.content.replace('\n', " "), 40)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for NoteListView {
  fn handle_key(&mut self, key: KeyEvent, store: &mut AppStore) -> ViewAction {
    // Overlays get the key first
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(value)) => {
        store.search_input(value);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Closed) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }
    match self.tag_picker.handle_key(key) {
      KeyResult::Event(TagPickerEvent::Selected(tag)) => {
        store.set_tag(tag);
        return ViewAction::None;
      }
      KeyResult::Event(TagPickerEvent::Cancelled) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('h') | KeyCode::Left => {
        let page = store.page();
        if page > 1 {
          store.set_page(page - 1);
        }
      }
      KeyCode::Char('l') | KeyCode::Right => {
        if let ListSnapshot::Ready { page, .. } = store.list_snapshot() {
          if store.page() < page.total_pages {
            store.set_page(store.page() + 1);
          }
        }
      }
      KeyCode::Char('/') => {
        self.search.activate(store.raw_search());
      }
      KeyCode::Char('t') => {
        self.tag_picker.show("Filter by tag", true, store.tag());
      }
      KeyCode::Char('n') => {
        store.begin_draft();
        return ViewAction::Push(Box::new(NoteFormView::new(store)));
      }
      KeyCode::Char('r') => {
        store.refetch_list();
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(note) = Self::notes(store).get(idx) {
            // Start the fetch now; the detail view finds it in the cache.
            store.prefetch_detail(&note.id);
            return ViewAction::Push(Box::new(NoteDetailView::new(
              note.id.clone(),
              note.title.clone(),
            )));
          }
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &AppStore) {
    self.render_list(frame, area, store);
    // Overlays render last
    self.search.render_overlay(frame, area);
    self.tag_picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Notes".to_string()
  }

  fn tick(&mut self, store: &mut AppStore) -> ViewAction {
    if !self.started {
      store.resolve_list();
      self.started = true;
    }
    ViewAction::None
  }

  fn hints(&self) -> &'static str {
    "/:search  t:tag  n:new  h/l:page  Enter:open  r:refresh  q:quit"
  }
}
