//! Keyed query cache with stale-while-revalidate semantics.
//!
//! Every `QueryKey` owns one slot: a small state machine (pending,
//! resolved, failed) with a generation counter. Fetches run as spawned
//! tasks that report back over a channel, and `poll` applies completed
//! results on the event-loop tick. A result is applied only while its
//! generation matches the slot's, so superseded fetches are discarded
//! instead of clobbering newer data.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::types::{Note, NotePage};
use crate::error::FetchError;

use super::key::{QueryKey, QueryPrefix};

/// Payload of a resolved query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
  List(NotePage),
  Detail(Note),
}

/// Where snapshot data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
  /// The entry for the requested key, current per policy.
  Fresh,
  /// The entry for the requested key while a refetch is in flight.
  Revalidating,
  /// The previously active list key's entry, served while the requested
  /// key is still pending.
  Previous,
}

/// Consumer view of one cache entry at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
  /// No data available anywhere yet.
  Loading,
  Ready { data: QueryData, origin: DataOrigin },
  Failed(FetchError),
}

enum SlotState {
  Pending,
  Resolved(QueryData),
  Failed(FetchError),
}

struct Slot {
  state: SlotState,
  /// Monotonic fetch counter; a completed fetch applies only while its
  /// generation still matches.
  generation: u64,
  inflight: bool,
  /// Set by prefix invalidation; forces a refetch on next resolve.
  stale: bool,
  fetched_at: Option<Instant>,
}

impl Slot {
  fn new() -> Self {
    Self {
      state: SlotState::Pending,
      generation: 0,
      inflight: false,
      stale: false,
      fetched_at: None,
    }
  }

  fn data(&self) -> Option<&QueryData> {
    match &self.state {
      SlotState::Resolved(data) => Some(data),
      _ => None,
    }
  }

  fn expired(&self, max_age: Duration) -> bool {
    self.fetched_at.is_some_and(|at| at.elapsed() > max_age)
  }
}

struct Completion {
  key: QueryKey,
  generation: u64,
  result: Result<QueryData, FetchError>,
}

/// The keyed cache. Owned by the store; all access happens between
/// suspension points of the single event-loop task, so no locking.
pub struct QueryCache {
  slots: HashMap<QueryKey, Slot>,
  /// Active list key, tracked for the previous-data fallback and for
  /// refetch-after-invalidation.
  active_list: Option<QueryKey>,
  /// Most recent list key whose slot held data when the active key moved
  /// off it.
  previous_list: Option<QueryKey>,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
  max_age: Duration,
}

impl QueryCache {
  pub fn new(max_age: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      slots: HashMap::new(),
      active_list: None,
      previous_list: None,
      tx,
      rx,
      max_age,
    }
  }

  /// Resolve `key`: return its current snapshot, spawning a fetch when the
  /// entry is missing, invalidated, expired, or failed. While a fetch for
  /// `key` is already in flight no second one is issued; callers share the
  /// outcome. Resolving a list key makes it the active listing.
  pub fn resolve<F, Fut>(&mut self, key: &QueryKey, fetch: F) -> Snapshot
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<QueryData, FetchError>> + Send + 'static,
  {
    if key.is_list() {
      self.activate_list(key);
    }
    self.ensure(key, fetch, false);
    self.snapshot(key)
  }

  /// Fetch `key` into the cache without activating it. This is the detail
  /// prefetch path: the consuming view later resolves the identical key
  /// and finds the entry (or joins the in-flight fetch) instead of issuing
  /// a second request.
  pub fn prefetch<F, Fut>(&mut self, key: &QueryKey, fetch: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<QueryData, FetchError>> + Send + 'static,
  {
    self.ensure(key, fetch, false);
  }

  /// Unconditionally refetch `key`, superseding any in-flight fetch.
  pub fn refetch<F, Fut>(&mut self, key: &QueryKey, fetch: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<QueryData, FetchError>> + Send + 'static,
  {
    self.ensure(key, fetch, true);
  }

  /// Read-only view of `key`, for rendering between resolves.
  pub fn snapshot(&self, key: &QueryKey) -> Snapshot {
    let Some(slot) = self.slots.get(key) else {
      return Snapshot::Loading;
    };

    match &slot.state {
      SlotState::Resolved(data) => Snapshot::Ready {
        data: data.clone(),
        origin: if slot.inflight {
          DataOrigin::Revalidating
        } else {
          DataOrigin::Fresh
        },
      },
      SlotState::Failed(error) => Snapshot::Failed(error.clone()),
      SlotState::Pending => {
        // Keep the previous listing on screen while the new key loads.
        // Scoped to the list family: a pending detail never borrows
        // another note's payload.
        if key.is_list() {
          if let Some(data) = self.previous_list_data(key) {
            return Snapshot::Ready {
              data: data.clone(),
              origin: DataOrigin::Previous,
            };
          }
        }
        Snapshot::Loading
      }
    }
  }

  /// Mark every entry matching `prefix` as needing a refetch. The active
  /// listing keeps its payload and revalidates on the next resolve; other
  /// matching entries drop theirs and start over on next access. Anything
  /// in flight for a matching key is superseded.
  pub fn invalidate(&mut self, prefix: &QueryPrefix) {
    for (key, slot) in self.slots.iter_mut() {
      if !key.matches(prefix) {
        continue;
      }
      slot.stale = true;
      slot.generation += 1;
      slot.inflight = false;
      if self.active_list.as_ref() != Some(key) {
        slot.state = SlotState::Pending;
        slot.fetched_at = None;
      }
    }

    // An invalidated previous key must not be served as fallback data.
    if self.previous_list.as_ref().is_some_and(|p| p.matches(prefix)) {
      self.previous_list = None;
    }

    debug!(?prefix, "cache invalidated");
  }

  /// Apply completed fetches. Returns true when any entry changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(done) = self.rx.try_recv() {
      let Some(slot) = self.slots.get_mut(&done.key) else {
        continue;
      };
      if done.generation != slot.generation {
        debug!(key = %done.key.describe(), "discarding superseded result");
        continue;
      }
      slot.inflight = false;
      slot.fetched_at = Some(Instant::now());
      slot.state = match done.result {
        Ok(data) => SlotState::Resolved(data),
        Err(error) => SlotState::Failed(error),
      };
      changed = true;
    }
    changed
  }

  fn ensure<F, Fut>(&mut self, key: &QueryKey, fetch: F, force: bool)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<QueryData, FetchError>> + Send + 'static,
  {
    let max_age = self.max_age;
    let slot = self.slots.entry(key.clone()).or_insert_with(Slot::new);

    let needs_fetch = force
      || slot.stale
      || (!slot.inflight
        && match &slot.state {
          SlotState::Pending => true,
          SlotState::Resolved(_) => slot.expired(max_age),
          // Fail-and-report: no automatic retry, but resolving the key
          // again tries again.
          SlotState::Failed(_) => true,
        });
    if !needs_fetch {
      return;
    }

    slot.stale = false;
    slot.inflight = true;
    slot.generation += 1;
    let generation = slot.generation;
    debug!(key = %key.describe(), generation, "fetch");

    let tx = self.tx.clone();
    let key = key.clone();
    let future = fetch();
    tokio::spawn(async move {
      let result = future.await;
      // Receiver gone means the cache itself was dropped.
      let _ = tx.send(Completion {
        key,
        generation,
        result,
      });
    });
  }

  fn activate_list(&mut self, key: &QueryKey) {
    if self.active_list.as_ref() == Some(key) {
      return;
    }
    if let Some(active) = self.active_list.take() {
      if self.slots.get(&active).is_some_and(|s| s.data().is_some()) {
        self.previous_list = Some(active);
      }
    }
    self.active_list = Some(key.clone());
  }

  fn previous_list_data(&self, key: &QueryKey) -> Option<&QueryData> {
    let previous = self.previous_list.as_ref().filter(|p| *p != key)?;
    self.slots.get(previous).and_then(Slot::data)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  use super::*;
  use crate::api::types::NoteId;

  const MAX_AGE: Duration = Duration::from_secs(60);

  fn page(total_pages: u32) -> QueryData {
    QueryData::List(NotePage {
      notes: Vec::new(),
      total_pages,
    })
  }

  fn total_pages(snapshot: &Snapshot) -> Option<u32> {
    match snapshot {
      Snapshot::Ready {
        data: QueryData::List(page),
        ..
      } => Some(page.total_pages),
      _ => None,
    }
  }

  /// Fetcher that counts invocations and resolves after a short delay.
  fn counted_fetch(
    counter: &Arc<AtomicU32>,
    delay: Duration,
    data: QueryData,
  ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<QueryData, FetchError>> + Send>>
  {
    let counter = Arc::clone(counter);
    move || {
      counter.fetch_add(1, Ordering::SeqCst);
      Box::pin(async move {
        tokio::time::sleep(delay).await;
        Ok(data)
      })
    }
  }

  async fn settle(cache: &mut QueryCache) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    cache.poll();
  }

  #[tokio::test]
  async fn test_concurrent_resolves_share_one_fetch() {
    let mut cache = QueryCache::new(MAX_AGE);
    let key = QueryKey::list("", 1, None);
    let fetches = Arc::new(AtomicU32::new(0));

    cache.resolve(&key, counted_fetch(&fetches, Duration::from_millis(20), page(1)));
    // Second resolve while the first is still in flight.
    cache.resolve(&key, counted_fetch(&fetches, Duration::from_millis(20), page(1)));

    settle(&mut cache).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(total_pages(&cache.snapshot(&key)), Some(1));
  }

  #[tokio::test]
  async fn test_previous_page_served_while_next_loads() {
    let mut cache = QueryCache::new(MAX_AGE);
    let page_one = QueryKey::list("", 1, None);
    let page_two = QueryKey::list("", 2, None);
    let fetches = Arc::new(AtomicU32::new(0));

    cache.resolve(&page_one, counted_fetch(&fetches, Duration::ZERO, page(5)));
    settle(&mut cache).await;

    // Page flips: the old page's notes stay up while page two loads.
    let snapshot = cache.resolve(&page_two, counted_fetch(&fetches, Duration::from_millis(30), page(6)));
    assert_eq!(
      snapshot,
      Snapshot::Ready {
        data: page(5),
        origin: DataOrigin::Previous,
      }
    );

    settle(&mut cache).await;
    let snapshot = cache.snapshot(&page_two);
    assert_eq!(total_pages(&snapshot), Some(6));
    assert!(matches!(
      snapshot,
      Snapshot::Ready {
        origin: DataOrigin::Fresh,
        ..
      }
    ));
  }

  #[tokio::test]
  async fn test_pending_detail_never_borrows_list_data() {
    let mut cache = QueryCache::new(MAX_AGE);
    let list = QueryKey::list("", 1, None);
    let detail = QueryKey::detail(NoteId::from("42"));
    let fetches = Arc::new(AtomicU32::new(0));

    cache.resolve(&list, counted_fetch(&fetches, Duration::ZERO, page(5)));
    settle(&mut cache).await;

    let snapshot = cache.resolve(
      &detail,
      counted_fetch(&fetches, Duration::from_millis(30), page(0)),
    );
    assert_eq!(snapshot, Snapshot::Loading);
  }

  #[tokio::test]
  async fn test_superseded_result_is_discarded() {
    let mut cache = QueryCache::new(MAX_AGE);
    let key = QueryKey::list("", 1, None);
    let fetches = Arc::new(AtomicU32::new(0));

    // Slow first fetch, then a forced refetch that lands first.
    cache.resolve(&key, counted_fetch(&fetches, Duration::from_millis(80), page(1)));
    cache.refetch(&key, counted_fetch(&fetches, Duration::from_millis(10), page(2)));

    tokio::time::sleep(Duration::from_millis(120)).await;
    cache.poll();

    // The slow result arrived last but carried a stale generation.
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(total_pages(&cache.snapshot(&key)), Some(2));
  }

  #[tokio::test]
  async fn test_invalidate_revalidates_active_and_evicts_rest() {
    let mut cache = QueryCache::new(MAX_AGE);
    let page_one = QueryKey::list("", 1, None);
    let page_two = QueryKey::list("", 2, None);
    let fetches_one = Arc::new(AtomicU32::new(0));
    let fetches_two = Arc::new(AtomicU32::new(0));

    cache.resolve(&page_one, counted_fetch(&fetches_one, Duration::ZERO, page(5)));
    settle(&mut cache).await;
    cache.resolve(&page_two, counted_fetch(&fetches_two, Duration::ZERO, page(5)));
    settle(&mut cache).await;

    cache.invalidate(&QueryPrefix::Lists);

    // Active key (page two) keeps its payload while revalidating.
    let snapshot = cache.resolve(&page_two, counted_fetch(&fetches_two, Duration::ZERO, page(7)));
    assert!(matches!(
      snapshot,
      Snapshot::Ready {
        origin: DataOrigin::Revalidating,
        ..
      }
    ));
    assert_eq!(fetches_two.load(Ordering::SeqCst), 2);

    settle(&mut cache).await;
    assert_eq!(total_pages(&cache.snapshot(&page_two)), Some(7));

    // The non-active page lost its payload and refetches on next access.
    assert_eq!(fetches_one.load(Ordering::SeqCst), 1);
    cache.resolve(&page_one, counted_fetch(&fetches_one, Duration::ZERO, page(7)));
    assert_eq!(fetches_one.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_failed_fetch_reports_and_resolve_retries() {
    let mut cache = QueryCache::new(MAX_AGE);
    let key = QueryKey::list("flaky", 1, None);
    let other = QueryKey::list("stable", 1, None);
    let fetches = Arc::new(AtomicU32::new(0));

    cache.resolve(&other, counted_fetch(&fetches, Duration::ZERO, page(3)));
    settle(&mut cache).await;

    let attempts = Arc::new(AtomicU32::new(0));
    let failing = {
      let attempts = Arc::clone(&attempts);
      move || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async move { Err::<QueryData, _>(FetchError::Network("connection reset".to_string())) }
      }
    };

    cache.resolve(&key, failing.clone());
    settle(&mut cache).await;
    assert!(matches!(cache.snapshot(&key), Snapshot::Failed(_)));

    // Other keys keep their cached data.
    assert_eq!(total_pages(&cache.snapshot(&other)), Some(3));

    // Resolving the failed key again issues a new request.
    cache.resolve(&key, failing);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn test_prefetch_then_resolve_is_one_fetch() {
    let mut cache = QueryCache::new(MAX_AGE);
    let key = QueryKey::detail(NoteId::from("42"));
    let fetches = Arc::new(AtomicU32::new(0));

    cache.prefetch(&key, counted_fetch(&fetches, Duration::from_millis(20), page(0)));
    // The view mounts before the prefetch lands and joins it.
    cache.resolve(&key, counted_fetch(&fetches, Duration::from_millis(20), page(0)));

    settle(&mut cache).await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    // And once landed, resolving again is a pure cache hit.
    cache.resolve(&key, counted_fetch(&fetches, Duration::from_millis(20), page(0)));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
  }
}
