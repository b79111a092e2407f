use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::sync::AppStore;

/// Actions that a view can request in response to user input or a tick
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior.
///
/// Views own presentation state only (selection, focus, overlays); all
/// collection and draft state lives in the store and is read back as
/// snapshots. Views return actions and the App executes them, keeping the
/// delegation chain App → View → Components.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent, store: &mut AppStore) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect, store: &AppStore);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick, after the store has polled.
  fn tick(&mut self, store: &mut AppStore) -> ViewAction {
    let _ = store;
    ViewAction::None
  }

  /// Key hints for the footer.
  fn hints(&self) -> &'static str {
    "q:back"
  }
}
