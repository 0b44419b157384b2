//! Process-local query cache keyed by a query identifier.
//!
//! The cache owns one `Query<T>` per key and is created by the application
//! root, then handed to views as an explicit shared dependency - never an
//! ambient global. Invalidating a key forces a refetch whose result
//! supersedes whatever the key held before, so views reading the key become
//! eventually consistent with the store after any mutation.

use crate::query::{Query, QueryState};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Cache key for the roster list query
pub const USERS_KEY: &str = "users";

pub struct QueryCache<T> {
  entries: HashMap<String, Query<T>>,
}

impl<T: Send + 'static> QueryCache<T> {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  /// Get the query under `key`, creating it with `fetcher` and starting
  /// its first fetch if the key is not present yet. An existing entry
  /// keeps its original fetcher; overlapping callers share one fetch.
  pub fn ensure<F, Fut>(&mut self, key: &str, fetcher: F) -> &mut Query<T>
  where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    self.entries.entry(key.to_string()).or_insert_with(|| {
      let mut query = Query::new(fetcher);
      query.fetch();
      query
    })
  }

  pub fn get(&self, key: &str) -> Option<&Query<T>> {
    self.entries.get(key)
  }

  /// Snapshot of the state under `key`; `Idle` if the key is absent.
  pub fn state(&self, key: &str) -> QueryState<T>
  where
    T: Clone,
  {
    self
      .entries
      .get(key)
      .map(|q| q.state().clone())
      .unwrap_or(QueryState::Idle)
  }

  /// Replace the data under `key` in place (a direct cache `set`). No-op
  /// for an absent key.
  pub fn set(&mut self, key: &str, data: T) {
    if let Some(query) = self.entries.get_mut(key) {
      query.set_data(data);
    }
  }

  /// Discard the value under `key` and refetch it. The stale value keeps
  /// rendering until the refetch lands, then is superseded.
  pub fn invalidate(&mut self, key: &str) {
    if let Some(query) = self.entries.get_mut(key) {
      info!(key, "invalidating cache key");
      query.refetch();
    }
  }

  /// Poll every entry for completed fetches. Returns `true` if any entry
  /// changed state.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    for query in self.entries.values_mut() {
      changed |= query.poll();
    }
    changed
  }
}

impl<T: Send + 'static> Default for QueryCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

/// Clonable handle to a cache shared between the app root and its views.
/// The mutex is only ever held for non-blocking reads and state flips,
/// never across an await.
pub struct SharedQueryCache<T> {
  inner: Arc<Mutex<QueryCache<T>>>,
}

impl<T> Clone for SharedQueryCache<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T: Send + 'static> SharedQueryCache<T> {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Mutex::new(QueryCache::new())),
    }
  }

  /// Run `f` with exclusive access to the cache. A poisoned lock is
  /// recovered rather than propagated; the worst a panicked holder can
  /// leave behind is a stale value.
  pub fn with<R>(&self, f: impl FnOnce(&mut QueryCache<T>) -> R) -> R {
    let mut guard = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    f(&mut guard)
  }

  pub fn invalidate(&self, key: &str) {
    self.with(|cache| cache.invalidate(key));
  }
}

impl<T: Send + 'static> Default for SharedQueryCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::time::Duration;

  #[tokio::test]
  async fn test_ensure_starts_one_fetch() {
    let calls = Arc::new(AtomicU32::new(0));
    let mut cache: QueryCache<u32> = QueryCache::new();

    for _ in 0..3 {
      let calls = calls.clone();
      cache.ensure(USERS_KEY, move || {
        let calls = calls.clone();
        async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) }
      });
    }

    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();

    // Repeated ensure calls share the single entry and its single fetch
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.get(USERS_KEY).and_then(|q| q.data()), Some(&0));
  }

  #[tokio::test]
  async fn test_invalidate_refetches_and_supersedes() {
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();
    let mut cache: QueryCache<u32> = QueryCache::new();

    cache.ensure(USERS_KEY, move || {
      let calls = calls_clone.clone();
      async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();
    assert_eq!(cache.get(USERS_KEY).and_then(|q| q.data()), Some(&0));

    // After invalidation the next completed fetch replaces the stale value
    cache.invalidate(USERS_KEY);
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();
    assert_eq!(cache.get(USERS_KEY).and_then(|q| q.data()), Some(&1));
  }

  #[tokio::test]
  async fn test_invalidate_absent_key_is_noop() {
    let mut cache: QueryCache<u32> = QueryCache::new();
    cache.invalidate("nope");
    assert!(cache.get("nope").is_none());
  }

  #[tokio::test]
  async fn test_set_patches_in_place() {
    let mut cache: QueryCache<Vec<u32>> = QueryCache::new();
    cache.ensure(USERS_KEY, || async { Ok(vec![1]) });
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.poll();

    cache.set(USERS_KEY, vec![1, 2]);
    assert_eq!(cache.get(USERS_KEY).and_then(|q| q.data()), Some(&vec![1, 2]));
  }

  #[tokio::test]
  async fn test_shared_handle_sees_same_entries() {
    let shared: SharedQueryCache<u32> = SharedQueryCache::new();
    let other = shared.clone();

    shared.with(|cache| {
      cache.ensure(USERS_KEY, || async { Ok(9) });
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    other.with(|cache| cache.poll());

    let data = other.with(|cache| cache.get(USERS_KEY).and_then(|q| q.data()).copied());
    assert_eq!(data, Some(9));
  }
}
