//! Error taxonomy for the synchronization core.
//!
//! `FetchError` covers remote failures and lives inside cache entries and
//! submission outcomes, so it is cloneable and owns its message text.
//! `ValidationError` never reaches the network: it is produced and consumed
//! entirely within the creation workflow.

use std::fmt;

use thiserror::Error;

use crate::api::types::NoteId;

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// The requested note id does not exist on the server.
  #[error("note {0} not found")]
  NotFound(NoteId),

  /// The server answered with a non-success status.
  #[error("server returned {status}: {message}")]
  Status { status: u16, message: String },

  /// The request never completed (connect, timeout, TLS, ...).
  #[error("network error: {0}")]
  Network(String),

  /// The response body could not be decoded.
  #[error("invalid response: {0}")]
  Decode(String),
}

impl FetchError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound(_))
  }
}

/// Form field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
  Title,
  Content,
  Tag,
}

impl fmt::Display for DraftField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      DraftField::Title => "title",
      DraftField::Content => "content",
      DraftField::Tag => "tag",
    };
    f.write_str(name)
  }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
  pub field: DraftField,
  pub message: &'static str,
}

/// One or more field validation failures, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
  pub fn push(&mut self, field: DraftField, message: &'static str) {
    self.0.push(ValidationError { field, message });
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The error for a specific field, if that field failed.
  pub fn field(&self, field: DraftField) -> Option<&ValidationError> {
    self.0.iter().find(|e| e.field == field)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, err) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}", err)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}
