//! The consumer-facing synchronization facade.
//!
//! `NotesStore` owns the query cache, the list controller, the draft, and
//! the submission machine, and wires them to the remote API. The event
//! loop calls `tick` once per iteration; everything else runs in response
//! to input. Views render from snapshots and never hold collection state
//! of their own.

use std::time::Duration;

use tracing::{info, warn};

use crate::api::types::{Note, NoteId, NotePage, NoteTag};
use crate::api::NotesApi;
use crate::error::{FetchError, ValidationErrors};

use super::cache::{DataOrigin, QueryCache, QueryData, Snapshot};
use super::debounce::ListController;
use super::draft::{DraftPatch, DraftStore, NoteDraft};
use super::key::{QueryKey, QueryPrefix};
use super::submit::{SubmitMachine, SubmitState};

/// Tuning for the synchronization layer.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
  /// Quiet window before a search term is applied.
  pub debounce: Duration,
  /// Age after which a resolved entry refetches on next access.
  pub max_age: Duration,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      debounce: Duration::from_millis(1000),
      max_age: Duration::from_secs(60),
    }
  }
}

/// Listing snapshot specialized for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSnapshot {
  Loading,
  Ready { page: NotePage, origin: DataOrigin },
  Failed(FetchError),
}

/// Detail snapshot specialized for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailSnapshot {
  Loading,
  Ready { note: Note, origin: DataOrigin },
  Failed(FetchError),
}

pub struct NotesStore<A: NotesApi> {
  api: A,
  cache: QueryCache,
  list: ListController,
  draft: Option<DraftStore>,
  submit: SubmitMachine,
}

impl<A: NotesApi> NotesStore<A> {
  pub fn new(api: A, initial_tag: Option<NoteTag>, options: SyncOptions) -> Self {
    Self {
      api,
      cache: QueryCache::new(options.max_age),
      list: ListController::new(options.debounce, initial_tag),
      draft: None,
      submit: SubmitMachine::new(),
    }
  }

  /// One fetch dispatcher for every key shape, so the cache never has to
  /// know about the API.
  async fn fetch(api: A, key: QueryKey) -> Result<QueryData, FetchError> {
    match key {
      QueryKey::List { search, page, tag } => {
        api.list_notes(&search, page, tag).await.map(QueryData::List)
      }
      QueryKey::Detail { id } => api.get_note(&id).await.map(QueryData::Detail),
    }
  }

  // --- listing ---

  /// Resolve the listing as currently configured, fetching as needed.
  pub fn resolve_list(&mut self) -> ListSnapshot {
    let key = self.list.key();
    let api = self.api.clone();
    let fetch_key = key.clone();
    let snapshot = self
      .cache
      .resolve(&key, move || Self::fetch(api, fetch_key));
    list_snapshot(snapshot)
  }

  /// Render-only view of the current listing.
  pub fn list_snapshot(&self) -> ListSnapshot {
    list_snapshot(self.cache.snapshot(&self.list.key()))
  }

  /// Force-refresh the current listing, superseding any in-flight fetch.
  pub fn refetch_list(&mut self) {
    let key = self.list.key();
    let api = self.api.clone();
    let fetch_key = key.clone();
    self
      .cache
      .refetch(&key, move || Self::fetch(api, fetch_key));
  }

  /// Feed one raw search keystroke. The term applies after the quiet
  /// window, together with a page reset, on a later `tick`.
  pub fn search_input(&mut self, value: impl Into<String>) {
    self.list.search_input(value);
  }

  pub fn raw_search(&self) -> &str {
    self.list.raw_search()
  }

  pub fn page(&self) -> u32 {
    self.list.page()
  }

  pub fn set_page(&mut self, page: u32) {
    if self.list.set_page(page) {
      self.resolve_list();
    }
  }

  pub fn tag(&self) -> Option<NoteTag> {
    self.list.tag()
  }

  pub fn set_tag(&mut self, tag: Option<NoteTag>) {
    if self.list.set_tag(tag) {
      self.resolve_list();
    }
  }

  // --- detail ---

  /// Resolve one note, fetching as needed. Calling this again after a
  /// failure retries.
  pub fn resolve_detail(&mut self, id: &NoteId) -> DetailSnapshot {
    let key = QueryKey::detail(id.clone());
    let api = self.api.clone();
    let fetch_key = key.clone();
    let snapshot = self
      .cache
      .resolve(&key, move || Self::fetch(api, fetch_key));
    detail_snapshot(snapshot)
  }

  /// Render-only view of one note.
  pub fn detail_snapshot(&self, id: &NoteId) -> DetailSnapshot {
    detail_snapshot(self.cache.snapshot(&QueryKey::detail(id.clone())))
  }

  /// Start fetching a note ahead of its view, under the identical key the
  /// view resolves. The mounted view then finds the entry (or joins the
  /// in-flight request) instead of fetching again.
  pub fn prefetch_detail(&mut self, id: &NoteId) {
    let key = QueryKey::detail(id.clone());
    let api = self.api.clone();
    let fetch_key = key.clone();
    self
      .cache
      .prefetch(&key, move || Self::fetch(api, fetch_key));
  }

  // --- creation workflow ---

  /// Open (or re-open) the creation workflow. An unfinished draft
  /// survives; a finished workflow starts over with an empty one.
  pub fn begin_draft(&mut self) -> &NoteDraft {
    if self.draft.is_none() {
      self.draft = Some(DraftStore::new());
      self.submit.reset();
    }
    self.draft.get_or_insert_with(DraftStore::new).get()
  }

  pub fn draft(&self) -> Option<&NoteDraft> {
    self.draft.as_ref().map(DraftStore::get)
  }

  /// Merge a field update into the draft. No-op outside a workflow.
  pub fn update_draft(&mut self, patch: DraftPatch) {
    if let Some(draft) = &mut self.draft {
      draft.set(patch);
    }
  }

  /// Destroy the draft: explicit cancellation of the workflow.
  pub fn cancel_draft(&mut self) {
    if self.draft.take().is_some() {
      info!("draft discarded");
    }
    self.submit.reset();
  }

  pub fn submit_state(&self) -> &SubmitState {
    self.submit.state()
  }

  /// Validate and submit the draft. Field errors come back without
  /// anything reaching the network; the remote outcome lands on a later
  /// `tick`.
  pub fn submit_draft(&mut self) -> Result<(), ValidationErrors> {
    let Some(draft) = &self.draft else {
      return Ok(());
    };
    let api = self.api.clone();
    self.submit.submit(draft.get(), move |payload| async move {
      api.create_note(&payload).await
    })
  }

  // --- tick ---

  /// Drive the poll cycle: apply completed fetches, settle the search
  /// debounce, and finish submissions. Returns true when anything changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = self.cache.poll();

    if self.list.poll() {
      // The settled term and the page reset are already applied; the new
      // key starts fetching in the same turn.
      self.resolve_list();
      changed = true;
    }

    match self.submit.poll() {
      Some(Ok(note)) => {
        info!(id = %note.id, "note created");
        // Success side effects, applied before anything can observe the
        // store again: every listing is out of date, the draft is done.
        self.cache.invalidate(&QueryPrefix::Lists);
        self.draft = None;
        self.resolve_list();
        changed = true;
      }
      Some(Err(error)) => {
        warn!(%error, "note creation failed");
        changed = true;
      }
      None => {}
    }

    changed
  }
}

fn list_snapshot(snapshot: Snapshot) -> ListSnapshot {
  match snapshot {
    Snapshot::Loading => ListSnapshot::Loading,
    Snapshot::Failed(error) => ListSnapshot::Failed(error),
    Snapshot::Ready {
      data: QueryData::List(page),
      origin,
    } => ListSnapshot::Ready { page, origin },
    // List keys only ever store list payloads.
    Snapshot::Ready { .. } => ListSnapshot::Loading,
  }
}

fn detail_snapshot(snapshot: Snapshot) -> DetailSnapshot {
  match snapshot {
    Snapshot::Loading => DetailSnapshot::Loading,
    Snapshot::Failed(error) => DetailSnapshot::Failed(error),
    Snapshot::Ready {
      data: QueryData::Detail(note),
      origin,
    } => DetailSnapshot::Ready { note, origin },
    // Detail keys only ever store detail payloads.
    Snapshot::Ready { .. } => DetailSnapshot::Loading,
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  use chrono::Utc;

  use super::*;
  use crate::api::types::{NewNote, NotePage};
  use crate::error::DraftField;

  fn note(id: &str, title: &str) -> Note {
    Note {
      id: NoteId::from(id),
      title: title.to_string(),
      content: String::new(),
      tag: NoteTag::Todo,
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  /// Counting stub standing in for the remote collection.
  #[derive(Clone, Default)]
  struct StubApi {
    lists: Arc<AtomicU32>,
    gets: Arc<AtomicU32>,
    creates: Arc<AtomicU32>,
    fail_creates: bool,
  }

  impl NotesApi for StubApi {
    async fn list_notes(
      &self,
      search: &str,
      page: u32,
      _tag: Option<NoteTag>,
    ) -> Result<NotePage, FetchError> {
      self.lists.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(Duration::from_millis(5)).await;
      Ok(NotePage {
        notes: vec![note("1", &format!("{}-p{}", search, page))],
        total_pages: 3,
      })
    }

    async fn get_note(&self, id: &NoteId) -> Result<Note, FetchError> {
      self.gets.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(Duration::from_millis(5)).await;
      if id.as_str() == "missing" {
        return Err(FetchError::NotFound(id.clone()));
      }
      Ok(note(id.as_str(), "stub"))
    }

    async fn create_note(&self, new_note: &NewNote) -> Result<Note, FetchError> {
      self.creates.fetch_add(1, Ordering::SeqCst);
      tokio::time::sleep(Duration::from_millis(5)).await;
      if self.fail_creates {
        return Err(FetchError::Status {
          status: 500,
          message: "boom".to_string(),
        });
      }
      Ok(note("9", &new_note.title))
    }
  }

  const TEST_OPTIONS: SyncOptions = SyncOptions {
    debounce: Duration::from_millis(30),
    max_age: Duration::from_secs(60),
  };

  fn store(api: StubApi) -> NotesStore<StubApi> {
    NotesStore::new(api, None, TEST_OPTIONS)
  }

  /// Tick until in-flight work lands.
  async fn settle(store: &mut NotesStore<StubApi>) {
    for _ in 0..8 {
      tokio::time::sleep(Duration::from_millis(10)).await;
      store.tick();
    }
  }

  fn ready_title(snapshot: &ListSnapshot) -> Option<&str> {
    match snapshot {
      ListSnapshot::Ready { page, .. } => page.notes.first().map(|n| n.title.as_str()),
      _ => None,
    }
  }

  #[tokio::test]
  async fn test_settled_search_refetches_page_one() {
    let api = StubApi::default();
    let mut store = store(api.clone());

    store.resolve_list();
    settle(&mut store).await;
    store.set_page(3);
    settle(&mut store).await;
    assert_eq!(api.lists.load(Ordering::SeqCst), 2);

    store.search_input("rust");
    // Not applied until the quiet window elapses.
    store.tick();
    assert_eq!(store.page(), 3);

    settle(&mut store).await;
    assert_eq!(store.page(), 1);
    assert_eq!(api.lists.load(Ordering::SeqCst), 3);
    assert_eq!(ready_title(&store.list_snapshot()), Some("rust-p1"));
  }

  #[tokio::test]
  async fn test_page_flip_keeps_previous_notes_visible() {
    let api = StubApi::default();
    let mut store = store(api.clone());

    store.resolve_list();
    settle(&mut store).await;

    store.set_page(2);
    let snapshot = store.list_snapshot();
    assert!(matches!(
      snapshot,
      ListSnapshot::Ready {
        origin: DataOrigin::Previous,
        ..
      }
    ));
    assert_eq!(ready_title(&snapshot), Some("-p1"));

    settle(&mut store).await;
    assert_eq!(ready_title(&store.list_snapshot()), Some("-p2"));
  }

  #[tokio::test]
  async fn test_prefetched_detail_is_not_fetched_again() {
    let api = StubApi::default();
    let mut store = store(api.clone());
    let id = NoteId::from("42");

    store.prefetch_detail(&id);
    // The view mounts immediately and resolves the same key.
    store.resolve_detail(&id);
    settle(&mut store).await;

    assert_eq!(api.gets.load(Ordering::SeqCst), 1);
    assert!(matches!(
      store.detail_snapshot(&id),
      DetailSnapshot::Ready { .. }
    ));
  }

  #[tokio::test]
  async fn test_missing_note_surfaces_not_found() {
    let api = StubApi::default();
    let mut store = store(api.clone());
    let id = NoteId::from("missing");

    store.resolve_detail(&id);
    settle(&mut store).await;

    match store.detail_snapshot(&id) {
      DetailSnapshot::Failed(error) => assert!(error.is_not_found()),
      other => panic!("expected not-found, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_successful_creation_invalidates_and_clears_draft() {
    let api = StubApi::default();
    let mut store = store(api.clone());

    store.resolve_list();
    settle(&mut store).await;
    assert_eq!(api.lists.load(Ordering::SeqCst), 1);

    store.begin_draft();
    store.update_draft(DraftPatch::title("Standup notes"));
    store.update_draft(DraftPatch::tag(NoteTag::Meeting));
    store.submit_draft().unwrap();
    settle(&mut store).await;

    assert!(matches!(store.submit_state(), SubmitState::Succeeded(_)));
    assert_eq!(api.creates.load(Ordering::SeqCst), 1);
    // The listing was invalidated and the active key refetched.
    assert_eq!(api.lists.load(Ordering::SeqCst), 2);
    // The draft is gone the moment success is observed.
    assert_eq!(store.draft(), None);
  }

  #[tokio::test]
  async fn test_failed_creation_keeps_draft_for_retry() {
    let api = StubApi {
      fail_creates: true,
      ..StubApi::default()
    };
    let mut store = store(api.clone());

    store.resolve_list();
    settle(&mut store).await;

    store.begin_draft();
    store.update_draft(DraftPatch::title("abc"));
    store.update_draft(DraftPatch::tag(NoteTag::Todo));
    store.submit_draft().unwrap();
    settle(&mut store).await;

    assert!(store.submit_state().error().is_some());
    assert_eq!(store.draft().map(|d| d.title.as_str()), Some("abc"));
    // No invalidation happened: the listing was not refetched.
    assert_eq!(api.lists.load(Ordering::SeqCst), 1);

    // The machine accepts a resubmission.
    store.submit_draft().unwrap();
    assert!(store.submit_state().is_submitting());
  }

  #[tokio::test]
  async fn test_validation_failure_blocks_the_request() {
    let api = StubApi::default();
    let mut store = store(api.clone());

    store.begin_draft();
    store.update_draft(DraftPatch::title("ab"));
    store.update_draft(DraftPatch::tag(NoteTag::Todo));

    let errors = store.submit_draft().unwrap_err();
    assert!(errors.field(DraftField::Title).is_some());
    assert_eq!(api.creates.load(Ordering::SeqCst), 0);
    assert_eq!(*store.submit_state(), SubmitState::Idle);
  }

  #[tokio::test]
  async fn test_draft_survives_until_cancelled() {
    let api = StubApi::default();
    let mut store = store(api);

    store.begin_draft();
    store.update_draft(DraftPatch::title("half-written"));

    // Re-opening the workflow (form closed and reopened) keeps the text.
    store.begin_draft();
    assert_eq!(store.draft().map(|d| d.title.as_str()), Some("half-written"));

    store.cancel_draft();
    assert_eq!(store.draft(), None);

    // The next workflow starts empty.
    assert_eq!(store.begin_draft().title, "");
  }
}
