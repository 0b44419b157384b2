//! Async query and mutation primitives for UI data fetching.
//!
//! Inspired by TanStack Query: a `Query<T>` owns its fetching closure plus
//! loading/success/error state, and a `Mutation<T>` runs a single write and
//! delivers its outcome exactly once. Both are polled from the UI tick, so
//! views never block the event loop and a superseded fetch can simply be
//! dropped without its late result ever being applied.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send>;

/// Async query for data fetching with state management.
///
/// ```ignore
/// let store = store_client.clone();
/// let mut query = Query::new(move || {
///   let store = store.clone();
///   async move { store.list_members().await.map_err(|e| e.to_string()) }
/// });
/// query.fetch();
///
/// // in the tick handler
/// query.poll();
///
/// // in render
/// match query.state() {
///   QueryState::Loading => { /* spinner */ }
///   QueryState::Success(members) => { /* rows */ }
///   QueryState::Error(e) => { /* error line */ }
///   QueryState::Idle => {}
/// }
/// ```
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function. The fetcher is
  /// called each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn is_error(&self) -> bool {
    matches!(self.state, QueryState::Error(_))
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start fetching data. No-op while a fetch is already in flight, which
  /// coalesces overlapping requests for the same query.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, superseding any fetch in flight. The pending fetch
  /// is cancelled by dropping its receiver; its result is discarded.
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Replace the held data locally without refetching (a cache `set`).
  pub fn set_data(&mut self, data: T) {
    self.state = QueryState::Success(data);
  }

  /// Poll for results from a pending fetch. Returns `true` if the state
  /// changed. Call this from the event loop tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending
        self.state = QueryState::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - the receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

/// A single async write operation (add, update, delete).
///
/// Unlike a query, a mutation has no retained data: `poll()` hands the
/// outcome to the caller exactly once so the view can react (invalidate a
/// cache key, show a notification) and then forget it.
#[derive(Debug, Default)]
pub struct Mutation<T> {
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Mutation<T> {
  pub fn new() -> Self {
    Self { receiver: None }
  }

  /// Whether an operation is in flight
  pub fn is_running(&self) -> bool {
    self.receiver.is_some()
  }

  /// Spawn the operation. Starting a new one supersedes any outcome still
  /// pending from a previous run.
  pub fn run<Fut>(&mut self, operation: Fut)
  where
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    tokio::spawn(async move {
      let result = operation.await;
      let _ = tx.send(result);
    });
  }

  /// Take the outcome if the operation has finished.
  pub fn poll(&mut self) -> Option<Result<T, String>> {
    let receiver = self.receiver.as_mut()?;

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        Some(result)
      }
      Err(mpsc::error::TryRecvError::Empty) => None,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.receiver = None;
        Some(Err("Operation was cancelled".to_string()))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("Something went wrong".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert_eq!(query.error(), Some("Something went wrong"));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(42)
    });

    query.fetch();
    assert!(query.is_loading());

    // Second fetch should be a no-op
    query.fetch();
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn test_refetch_supersedes_pending() {
    let counter = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch cancels the first fetch and starts a new one
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    query.poll();
    // Only the second fetch's result is ever applied
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_set_data_patches_locally() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1]) });
    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;
    query.poll();

    query.set_data(vec![1, 2]);
    assert_eq!(query.data(), Some(&vec![1, 2]));
  }

  #[tokio::test]
  async fn test_mutation_outcome_delivered_once() {
    let mut mutation: Mutation<u32> = Mutation::new();
    assert!(!mutation.is_running());

    mutation.run(async { Ok(7) });
    assert!(mutation.is_running());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(mutation.poll(), Some(Ok(7)));
    assert!(!mutation.is_running());
    assert_eq!(mutation.poll(), None);
  }

  #[tokio::test]
  async fn test_mutation_error_outcome() {
    let mut mutation: Mutation<()> = Mutation::new();
    mutation.run(async { Err("boom".to_string()) });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(mutation.poll(), Some(Err("boom".to_string())));
  }
}
