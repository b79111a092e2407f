use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled without changing the value (cursor movement)
  Consumed,
  /// Key was handled and the value changed
  Edited,
  /// Enter pressed on a single-line input, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Reusable text input. Single-line by default; in multiline mode Enter
/// inserts a newline instead of submitting.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
  multiline: bool,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn multiline() -> Self {
    Self {
      multiline: true,
      ..Self::default()
    }
  }

  /// Get the current input value
  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Replace the value, e.g. when prefilling from a stored draft.
  pub fn set_value(&mut self, value: impl Into<String>) {
    self.buffer = value.into();
    self.cursor = self.buffer.len();
  }

  /// Clear the input
  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Handle a key event, returning the result
  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter if self.multiline => {
        self.buffer.insert(self.cursor, '\n');
        self.cursor += 1;
        InputResult::Edited
      }
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if let Some(prev) = self.prev_boundary() {
          self.buffer.remove(prev);
          self.cursor = prev;
          InputResult::Edited
        } else {
          InputResult::Consumed
        }
      }
      KeyCode::Delete => {
        if self.cursor < self.buffer.len() {
          self.buffer.remove(self.cursor);
          InputResult::Edited
        } else {
          InputResult::Consumed
        }
      }
      KeyCode::Left => {
        if let Some(prev) = self.prev_boundary() {
          self.cursor = prev;
        }
        InputResult::Consumed
      }
      KeyCode::Right => {
        if let Some(next) = self.next_boundary() {
          self.cursor = next;
        }
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.buffer.len();
        InputResult::Consumed
      }
      KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.cursor = self.buffer.len();
        InputResult::Consumed
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        // Clear everything before the cursor
        self.buffer = self.buffer[self.cursor..].to_string();
        self.cursor = 0;
        InputResult::Edited
      }
      KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        // Delete the word before the cursor
        if self.cursor > 0 {
          let before = &self.buffer[..self.cursor];
          let new_cursor = before.trim_end().rfind(' ').map(|i| i + 1).unwrap_or(0);
          self.buffer = format!(
            "{}{}",
            &self.buffer[..new_cursor],
            &self.buffer[self.cursor..]
          );
          self.cursor = new_cursor;
          InputResult::Edited
        } else {
          InputResult::Consumed
        }
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        InputResult::Edited
      }
      _ => InputResult::NotHandled,
    }
  }

  /// Byte index of the previous character boundary, if any.
  fn prev_boundary(&self) -> Option<usize> {
    self.buffer[..self.cursor]
      .char_indices()
      .next_back()
      .map(|(i, _)| i)
  }

  /// Byte index past the next character, if any.
  fn next_boundary(&self) -> Option<usize> {
    self.buffer[self.cursor..]
      .chars()
      .next()
      .map(|c| self.cursor + c.len_utf8())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn type_str(input: &mut TextInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_basic_input() {
    let mut input = TextInput::new();
    assert!(input.is_empty());

    assert_eq!(input.handle_key(key(KeyCode::Char('h'))), InputResult::Edited);
    input.handle_key(key(KeyCode::Char('i')));
    assert_eq!(input.value(), "hi");
  }

  #[test]
  fn test_submit_single_line() {
    let mut input = TextInput::new();
    type_str(&mut input, "test");

    let result = input.handle_key(key(KeyCode::Enter));
    assert_eq!(result, InputResult::Submitted("test".to_string()));
  }

  #[test]
  fn test_enter_inserts_newline_in_multiline() {
    let mut input = TextInput::multiline();
    type_str(&mut input, "ab");
    assert_eq!(input.handle_key(key(KeyCode::Enter)), InputResult::Edited);
    type_str(&mut input, "cd");
    assert_eq!(input.value(), "ab\ncd");
  }

  #[test]
  fn test_cursor_movement_is_not_an_edit() {
    let mut input = TextInput::new();
    type_str(&mut input, "ac");
    assert_eq!(input.handle_key(key(KeyCode::Left)), InputResult::Consumed);
    input.handle_key(key(KeyCode::Char('b')));
    assert_eq!(input.value(), "abc");
  }

  #[test]
  fn test_backspace() {
    let mut input = TextInput::new();
    type_str(&mut input, "abc");
    assert_eq!(input.handle_key(key(KeyCode::Backspace)), InputResult::Edited);
    assert_eq!(input.value(), "ab");
  }

  #[test]
  fn test_backspace_at_start_is_not_an_edit() {
    let mut input = TextInput::new();
    assert_eq!(
      input.handle_key(key(KeyCode::Backspace)),
      InputResult::Consumed
    );
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = TextInput::new();
    type_str(&mut input, "note café");
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "note caf");
    type_str(&mut input, "é");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Char('x')));
    assert_eq!(input.value(), "note caxfé");
  }

  #[test]
  fn test_set_value_moves_cursor_to_end() {
    let mut input = TextInput::new();
    input.set_value("draft title");
    type_str(&mut input, "!");
    assert_eq!(input.value(), "draft title!");
  }

  #[test]
  fn test_ctrl_u_clears_before_cursor() {
    let mut input = TextInput::new();
    type_str(&mut input, "hello world");
    for _ in 0..5 {
      input.handle_key(key(KeyCode::Left));
    }
    assert_eq!(input.handle_key(ctrl_key(KeyCode::Char('u'))), InputResult::Edited);
    assert_eq!(input.value(), "world");
  }

  #[test]
  fn test_ctrl_w_deletes_word() {
    let mut input = TextInput::new();
    type_str(&mut input, "buy more milk");
    input.handle_key(ctrl_key(KeyCode::Char('w')));
    assert_eq!(input.value(), "buy more ");
  }

  #[test]
  fn test_cancel() {
    let mut input = TextInput::new();
    type_str(&mut input, "x");
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }
}
