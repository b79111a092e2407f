//! The in-progress note draft and its validation rules.

use crate::api::types::{NewNote, NoteTag};
use crate::error::{DraftField, ValidationErrors};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 50;
pub const CONTENT_MAX: usize = 500;

/// Unsaved note input. Field values mirror the form exactly; validation
/// happens on submission, not on edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
  pub title: String,
  pub content: String,
  pub tag: Option<NoteTag>,
}

impl NoteDraft {
  /// Check the draft against the creation rules, producing the payload the
  /// server accepts. The title is trimmed before the length check and in
  /// the produced payload.
  pub fn validate(&self) -> Result<NewNote, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = self.title.trim();
    let title_len = title.chars().count();
    if title.is_empty() {
      errors.push(DraftField::Title, "required");
    } else if title_len < TITLE_MIN {
      errors.push(DraftField::Title, "min 3 characters");
    } else if title_len > TITLE_MAX {
      errors.push(DraftField::Title, "max 50 characters");
    }

    if self.content.chars().count() > CONTENT_MAX {
      errors.push(DraftField::Content, "max 500 characters");
    }

    if self.tag.is_none() {
      errors.push(DraftField::Tag, "required");
    }

    match self.tag {
      Some(tag) if errors.is_empty() => Ok(NewNote {
        title: title.to_string(),
        content: self.content.clone(),
        tag,
      }),
      _ => Err(errors),
    }
  }
}

/// A partial draft update; unset fields keep their current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPatch {
  title: Option<String>,
  content: Option<String>,
  tag: Option<NoteTag>,
}

impl DraftPatch {
  pub fn title(value: impl Into<String>) -> Self {
    Self {
      title: Some(value.into()),
      ..Self::default()
    }
  }

  pub fn content(value: impl Into<String>) -> Self {
    Self {
      content: Some(value.into()),
      ..Self::default()
    }
  }

  pub fn tag(tag: NoteTag) -> Self {
    Self {
      tag: Some(tag),
      ..Self::default()
    }
  }
}

/// Holder of the single in-progress draft.
///
/// One instance exists per creation workflow: the store creates it when
/// the workflow opens and drops it on successful submission or explicit
/// cancellation. Closing the form view does not touch it, which is what
/// keeps unsaved input alive across open/close cycles.
#[derive(Debug, Default)]
pub struct DraftStore {
  draft: NoteDraft,
}

impl DraftStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self) -> &NoteDraft {
    &self.draft
  }

  /// Merge the patch into the draft; unspecified fields keep prior values.
  pub fn set(&mut self, patch: DraftPatch) {
    if let Some(title) = patch.title {
      self.draft.title = title;
    }
    if let Some(content) = patch.content {
      self.draft.content = content;
    }
    if let Some(tag) = patch.tag {
      self.draft.tag = Some(tag);
    }
  }

  /// Reset to the empty draft.
  pub fn clear(&mut self) {
    self.draft = NoteDraft::default();
  }
}
