use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::input::{InputResult, TextInput};
use super::KeyResult;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Search text changed (emitted on each keystroke; empty on cancel)
  Changed(String),
  /// Overlay closed, the current filter persists
  Closed,
}

/// Search overlay. Every keystroke is reported raw; debouncing is the
/// store's concern, not this component's.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if search is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Activate search mode, continuing from the given term.
  pub fn activate(&mut self, current: &str) {
    self.active = true;
    self.input.set_value(current);
  }

  /// Handle a key event.
  /// Call this regardless of active state - it handles activation too.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Closed)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Edited => KeyResult::Event(SearchEvent::Changed(self.input.value().to_string())),
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60);
    let height = 3; // Just input line with borders

    // Position at top-left of content area with small margin
    let x = area.x + 1;
    let y = area.y + 1;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let input_line = Line::from(vec![
      Span::styled("/", Style::default().fg(Color::Yellow)),
      Span::raw(self.input.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
  }
}
