use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::error::{DraftField, ValidationErrors};
use crate::sync::{AppStore, DraftPatch, SubmitState};
use crate::ui::components::{InputResult, KeyResult, TagPicker, TagPickerEvent, TextInput};
use crate::ui::view::{View, ViewAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormFocus {
  Title,
  Content,
  Tag,
}

impl FormFocus {
  fn next(self) -> Self {
    match self {
      FormFocus::Title => FormFocus::Content,
      FormFocus::Content => FormFocus::Tag,
      FormFocus::Tag => FormFocus::Title,
    }
  }

  fn previous(self) -> Self {
    match self {
      FormFocus::Title => FormFocus::Tag,
      FormFocus::Content => FormFocus::Title,
      FormFocus::Tag => FormFocus::Content,
    }
  }
}

/// The note creation form.
///
/// Field values live in the store's draft, not here: the inputs are
/// initialized from the draft on open and push every edit back, so closing
/// the form and reopening it continues where the user left off.
pub struct NoteFormView {
  focus: FormFocus,
  title: TextInput,
  content: TextInput,
  tag_picker: TagPicker,
  errors: ValidationErrors,
}

impl NoteFormView {
  /// Build the form over the store's current draft (the caller has already
  /// called `begin_draft`).
  pub fn new(store: &AppStore) -> Self {
    let mut title = TextInput::new();
    let mut content = TextInput::multiline();
    if let Some(draft) = store.draft() {
      title.set_value(draft.title.clone());
      content.set_value(draft.content.clone());
    }

    Self {
      focus: FormFocus::Title,
      title,
      content,
      tag_picker: TagPicker::new(),
      errors: ValidationErrors::default(),
    }
  }

  fn field_error(&self, field: DraftField) -> Option<String> {
    self.errors.field(field).map(|e| e.message.to_string())
  }

  fn render_field(
    &self,
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    error: Option<String>,
  ) {
    let border = if focused {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let title = match error {
      Some(message) => Line::from(vec![
        Span::raw(format!(" {} ", label)),
        Span::styled(format!("({}) ", message), Style::default().fg(Color::Red)),
      ]),
      None => Line::from(format!(" {} ", label)),
    };

    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(border);

    let shown = if focused {
      format!("{}_", value)
    } else {
      value.to_string()
    };
    let paragraph = Paragraph::new(shown).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}

impl View for NoteFormView {
  fn handle_key(&mut self, key: KeyEvent, store: &mut AppStore) -> ViewAction {
    match self.tag_picker.handle_key(key) {
      KeyResult::Event(TagPickerEvent::Selected(Some(tag))) => {
        store.update_draft(DraftPatch::tag(tag));
        return ViewAction::None;
      }
      KeyResult::Event(_) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    // Workflow-level keys before field editing
    match key.code {
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        match store.submit_draft() {
          Ok(()) => self.errors = ValidationErrors::default(),
          Err(errors) => self.errors = errors,
        }
        return ViewAction::None;
      }
      KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        store.cancel_draft();
        return ViewAction::Pop;
      }
      KeyCode::Esc => {
        // Close without cancelling: the draft stays for next time.
        return ViewAction::Pop;
      }
      KeyCode::Tab | KeyCode::Down => {
        self.focus = self.focus.next();
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = self.focus.previous();
        return ViewAction::None;
      }
      _ => {}
    }

    match self.focus {
      FormFocus::Title => match self.title.handle_key(key) {
        InputResult::Edited => {
          store.update_draft(DraftPatch::title(self.title.value()));
        }
        InputResult::Submitted(_) => {
          self.focus = FormFocus::Content;
        }
        _ => {}
      },
      FormFocus::Content => {
        if let InputResult::Edited = self.content.handle_key(key) {
          store.update_draft(DraftPatch::content(self.content.value()));
        }
      }
      FormFocus::Tag => {
        if key.code == KeyCode::Enter {
          let current = store.draft().and_then(|d| d.tag);
          self.tag_picker.show("Tag", false, current);
        }
      }
    }

    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, store: &AppStore) {
    let block = Block::default()
      .title(" Create note ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Title
        Constraint::Min(5),    // Content
        Constraint::Length(3), // Tag
        Constraint::Length(1), // Status line
      ])
      .split(inner);

    let draft = store.draft().cloned().unwrap_or_default();

    self.render_field(
      frame,
      chunks[0],
      "Title",
      &draft.title,
      self.focus == FormFocus::Title,
      self.field_error(DraftField::Title),
    );
    self.render_field(
      frame,
      chunks[1],
      "Content",
      &draft.content,
      self.focus == FormFocus::Content,
      self.field_error(DraftField::Content),
    );

    let tag_value = match draft.tag {
      Some(tag) => tag.as_str().to_string(),
      None => "(press Enter to pick)".to_string(),
    };
    self.render_field(
      frame,
      chunks[2],
      "Tag",
      &tag_value,
      self.focus == FormFocus::Tag,
      self.field_error(DraftField::Tag),
    );

    let submit = store.submit_state();
    let (status, style) = if submit.is_submitting() {
      ("Creating...".to_string(), Style::default().fg(Color::Yellow))
    } else if let Some(error) = submit.error() {
      (
        format!("Creation failed: {}. Fix and press Ctrl-S to retry.", error),
        Style::default().fg(Color::Red),
      )
    } else {
      (String::new(), Style::default())
    };
    frame.render_widget(Paragraph::new(status).style(style), chunks[3]);

    self.tag_picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "New note".to_string()
  }

  fn tick(&mut self, store: &mut AppStore) -> ViewAction {
    // The store has already invalidated the listing and dropped the draft.
    if matches!(store.submit_state(), SubmitState::Succeeded(_)) {
      return ViewAction::Pop;
    }
    ViewAction::None
  }

  fn hints(&self) -> &'static str {
    "Tab:field  Ctrl-S:create  Ctrl-D:discard  Esc:close"
  }
}
