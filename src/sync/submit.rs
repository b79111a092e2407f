//! Note submission state machine.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{NewNote, Note};
use crate::error::{FetchError, ValidationErrors};

use super::draft::NoteDraft;

/// Lifecycle of one creation request.
///
/// `Failed` is not terminal: the draft is untouched and the machine
/// accepts a corrected resubmission, exactly like `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
  #[default]
  Idle,
  Submitting,
  Succeeded(Note),
  Failed(FetchError),
}

impl SubmitState {
  pub fn is_submitting(&self) -> bool {
    matches!(self, SubmitState::Submitting)
  }

  pub fn error(&self) -> Option<&FetchError> {
    match self {
      SubmitState::Failed(error) => Some(error),
      _ => None,
    }
  }
}

/// Drives one note creation at a time: validate, submit, report.
pub struct SubmitMachine {
  state: SubmitState,
  rx: Option<mpsc::UnboundedReceiver<Result<Note, FetchError>>>,
}

impl SubmitMachine {
  pub fn new() -> Self {
    Self {
      state: SubmitState::Idle,
      rx: None,
    }
  }

  pub fn state(&self) -> &SubmitState {
    &self.state
  }

  /// Validate the draft and start the remote create.
  ///
  /// Validation failure reports the offending fields and leaves the
  /// machine where it was; nothing reaches the network. A submission
  /// already in flight makes this a no-op.
  pub fn submit<F, Fut>(&mut self, draft: &NoteDraft, fetch: F) -> Result<(), ValidationErrors>
  where
    F: FnOnce(NewNote) -> Fut,
    Fut: Future<Output = Result<Note, FetchError>> + Send + 'static,
  {
    if self.state.is_submitting() {
      return Ok(());
    }

    let payload = draft.validate()?;

    let (tx, rx) = mpsc::unbounded_channel();
    self.rx = Some(rx);
    self.state = SubmitState::Submitting;
    debug!(title = %payload.title, "submitting note");

    let future = fetch(payload);
    tokio::spawn(async move {
      let _ = tx.send(future.await);
    });

    Ok(())
  }

  /// Apply a completed submission, reporting the outcome exactly once.
  pub fn poll(&mut self) -> Option<Result<Note, FetchError>> {
    let rx = self.rx.as_mut()?;
    let result = match rx.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        Err(FetchError::Network("submission task dropped".to_string()))
      }
    };

    self.rx = None;
    self.state = match &result {
      Ok(note) => SubmitState::Succeeded(note.clone()),
      Err(error) => SubmitState::Failed(error.clone()),
    };
    Some(result)
  }

  /// Back to a clean `Idle`, for the start of a new workflow.
  pub fn reset(&mut self) {
    self.state = SubmitState::Idle;
    self.rx = None;
  }
}

impl Default for SubmitMachine {
  fn default() -> Self {
    Self::new()
  }
}
