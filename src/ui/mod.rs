pub mod components;
pub mod view;
pub mod views;

use ratatui::prelude::Color;
use ratatui::widgets::ListState;

use crate::api::types::NoteTag;

/// Clamp a list selection to the current item count.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(selected) if selected >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated. Character-aware: note text is arbitrary user input.
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    return s.to_string();
  }
  let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
  format!("{}...", kept)
}

/// Display color for a note tag.
pub fn tag_color(tag: NoteTag) -> Color {
  match tag {
    NoteTag::Todo => Color::Yellow,
    NoteTag::Work => Color::Blue,
    NoteTag::Personal => Color::Magenta,
    NoteTag::Meeting => Color::Green,
    NoteTag::Shopping => Color::Cyan,
  }
}
