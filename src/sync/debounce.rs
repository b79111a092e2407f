//! Trailing-edge debounce for search input, and the list controller that
//! couples it to pagination.

use std::time::{Duration, Instant};

use crate::api::types::NoteTag;

use super::key::QueryKey;

/// Collapses a stream of raw input values into one settled value per quiet
/// period. No leading-edge emission: the first keystroke only starts the
/// window, and the final value within it is the one emitted.
#[derive(Debug)]
pub struct Debouncer {
  settled: String,
  pending: Option<Pending>,
  window: Duration,
}

#[derive(Debug)]
struct Pending {
  value: String,
  since: Instant,
}

impl Debouncer {
  pub fn new(window: Duration) -> Self {
    Self {
      settled: String::new(),
      pending: None,
      window,
    }
  }

  /// Latest raw value, for echoing the input as typed.
  pub fn raw(&self) -> &str {
    match &self.pending {
      Some(pending) => &pending.value,
      None => &self.settled,
    }
  }

  /// Latest settled value.
  pub fn settled(&self) -> &str {
    &self.settled
  }

  /// Feed one raw input value, restarting the quiet window. Reverting to
  /// the settled value cancels the pending emission.
  pub fn input(&mut self, value: impl Into<String>) {
    let value = value.into();
    if value == self.settled {
      self.pending = None;
      return;
    }
    self.pending = Some(Pending {
      value,
      since: Instant::now(),
    });
  }

  /// Settle the pending value once the quiet window has elapsed. Returns
  /// the newly settled value exactly once per stabilization.
  pub fn poll(&mut self) -> Option<String> {
    let elapsed = self
      .pending
      .as_ref()
      .is_some_and(|p| p.since.elapsed() >= self.window);
    if !elapsed {
      return None;
    }
    let pending = self.pending.take()?;
    self.settled = pending.value.clone();
    Some(pending.value)
  }
}

/// Owns the inputs of the active listing query: the debounced search term,
/// the page number, and the tag filter.
///
/// Page and search move together: a newly settled search term resets the
/// page to 1 in the same step, so a stale page number can never pair with a
/// new search term. Changing the tag filter resets the page the same way.
#[derive(Debug)]
pub struct ListController {
  search: Debouncer,
  page: u32,
  tag: Option<NoteTag>,
}

impl ListController {
  pub fn new(window: Duration, tag: Option<NoteTag>) -> Self {
    Self {
      search: Debouncer::new(window),
      page: 1,
      tag,
    }
  }

  /// The cache key for the listing as currently configured.
  pub fn key(&self) -> QueryKey {
    QueryKey::list(self.search.settled(), self.page, self.tag)
  }

  pub fn search_input(&mut self, value: impl Into<String>) {
    self.search.input(value);
  }

  pub fn raw_search(&self) -> &str {
    self.search.raw()
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  /// Returns true when the page actually changed. Pages start at 1.
  pub fn set_page(&mut self, page: u32) -> bool {
    let page = page.max(1);
    if page == self.page {
      return false;
    }
    self.page = page;
    true
  }

  pub fn tag(&self) -> Option<NoteTag> {
    self.tag
  }

  /// Returns true when the filter actually changed.
  pub fn set_tag(&mut self, tag: Option<NoteTag>) -> bool {
    if tag == self.tag {
      return false;
    }
    self.tag = tag;
    self.page = 1;
    true
  }

  /// Apply a settled search term, if any. Returns true when the active key
  /// changed; the page reset happens in the same call.
  pub fn poll(&mut self) -> bool {
    if self.search.poll().is_some() {
      self.page = 1;
      return true;
    }
    false
  }
}

#[cfg(test)]
mod tests {
  use std::thread::sleep;

  use super::*;

  const WINDOW: Duration = Duration::from_millis(25);

  #[test]
  fn test_rapid_input_collapses_to_final_value() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.input("r");
    debouncer.input("ru");
    debouncer.input("rust");
    assert_eq!(debouncer.poll(), None);

    sleep(Duration::from_millis(40));
    assert_eq!(debouncer.poll(), Some("rust".to_string()));
    // One emission per stabilization.
    assert_eq!(debouncer.poll(), None);
    assert_eq!(debouncer.settled(), "rust");
  }

  #[test]
  fn test_new_input_restarts_window() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.input("a");
    sleep(Duration::from_millis(15));
    debouncer.input("ab");
    sleep(Duration::from_millis(15));
    // The second keystroke restarted the window; nothing settles yet.
    assert_eq!(debouncer.poll(), None);

    sleep(Duration::from_millis(30));
    assert_eq!(debouncer.poll(), Some("ab".to_string()));
  }

  #[test]
  fn test_reverting_to_settled_cancels_emission() {
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.input("a");
    sleep(Duration::from_millis(40));
    assert_eq!(debouncer.poll(), Some("a".to_string()));

    debouncer.input("ab");
    debouncer.input("a");
    sleep(Duration::from_millis(40));
    assert_eq!(debouncer.poll(), None);
  }

  #[test]
  fn test_settled_search_resets_page_atomically() {
    let mut list = ListController::new(WINDOW, None);
    list.set_page(4);
    list.search_input("meeting");
    assert_eq!(list.page(), 4);

    sleep(Duration::from_millis(40));
    assert!(list.poll());
    assert_eq!(list.page(), 1);
    assert_eq!(list.key(), QueryKey::list("meeting", 1, None));
  }

  #[test]
  fn test_tag_change_resets_page() {
    let mut list = ListController::new(WINDOW, None);
    list.set_page(3);
    assert!(list.set_tag(Some(NoteTag::Work)));
    assert_eq!(list.page(), 1);
    assert!(!list.set_tag(Some(NoteTag::Work)));
  }

  #[test]
  fn test_page_is_clamped_to_one() {
    let mut list = ListController::new(WINDOW, None);
    assert!(!list.set_page(0));
    assert_eq!(list.page(), 1);
  }
}
