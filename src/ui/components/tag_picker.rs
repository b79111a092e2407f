use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

use crate::api::types::NoteTag;
use crate::ui::tag_color;

use super::KeyResult;

/// Events emitted by the tag picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPickerEvent {
  /// A choice was made. `None` means "all tags" (list filtering only).
  Selected(Option<NoteTag>),
  /// Picker cancelled
  Cancelled,
}

/// Overlay for choosing a note tag, used both for the list filter (with an
/// extra "All" entry) and for the creation form's tag field.
#[derive(Debug, Clone, Default)]
pub struct TagPicker {
  active: bool,
  choices: Vec<Option<NoteTag>>,
  selected: usize,
  title: String,
}

impl TagPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker, preselecting the current choice.
  pub fn show(&mut self, title: impl Into<String>, with_all: bool, current: Option<NoteTag>) {
    self.choices = if with_all {
      std::iter::once(None)
        .chain(NoteTag::ALL.into_iter().map(Some))
        .collect()
    } else {
      NoteTag::ALL.into_iter().map(Some).collect()
    };
    self.selected = self
      .choices
      .iter()
      .position(|c| *c == current)
      .unwrap_or(0);
    self.title = title.into();
    self.active = true;
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.choices.clear();
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<TagPickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(TagPickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let choice = self.choices.get(self.selected).copied();
        self.hide();
        match choice {
          Some(choice) => KeyResult::Event(TagPickerEvent::Selected(choice)),
          None => KeyResult::Event(TagPickerEvent::Cancelled),
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.choices.is_empty() {
          self.selected = (self.selected + 1) % self.choices.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.choices.is_empty() {
          self.selected = if self.selected == 0 {
            self.choices.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.choices.is_empty() {
      return;
    }

    let width = (self.title.len() as u16 + 6).clamp(20, area.width.saturating_sub(4).max(20));
    let height = (self.choices.len() as u16 + 2).min(area.height.saturating_sub(4).max(3));

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .choices
      .iter()
      .map(|choice| {
        let line = match choice {
          Some(tag) => Line::from(Span::styled(
            tag.as_str(),
            Style::default().fg(tag_color(*tag)),
          )),
          None => Line::from(Span::styled("All", Style::default().fg(Color::White))),
        };
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyModifiers;

  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_preselects_current_choice() {
    let mut picker = TagPicker::new();
    picker.show("Tag", false, Some(NoteTag::Meeting));
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(TagPickerEvent::Selected(Some(NoteTag::Meeting)))
    );
    assert!(!picker.is_active());
  }

  #[test]
  fn test_all_entry_selects_no_filter() {
    let mut picker = TagPicker::new();
    picker.show("Filter by tag", true, Some(NoteTag::Work));
    // Move up from "Work" to the top "All" entry.
    for _ in 0..2 {
      picker.handle_key(key(KeyCode::Up));
    }
    assert_eq!(
      picker.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(TagPickerEvent::Selected(None))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut picker = TagPicker::new();
    picker.show("Tag", false, None);
    assert_eq!(
      picker.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(TagPickerEvent::Cancelled)
    );
  }
}
