//! Async query abstraction for the data a view shows.
//!
//! A `Query<T>` owns a fetcher closure, spawns it on the tokio runtime and
//! hands the result back through a channel that the view polls on every
//! tick. Data from the last successful fetch is kept while a refetch is in
//! flight and after a failed one, so a flaky backend never blanks a list.
//!
//! ```ignore
//! let crm = crm.clone();
//! let mut query = Query::new(move || {
//!   let crm = crm.clone();
//!   async move { crm.list_records(EntityKind::Leads).await.map_err(|e| e.to_string()) }
//! });
//! query.fetch();
//!
//! // on tick
//! if query.poll() { /* re-render */ }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Where the latest fetch stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
  /// Never fetched
  Idle,
  /// A fetch is in flight
  Loading,
  /// Last fetch succeeded
  Ready,
  /// Last fetch failed
  Failed(String),
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

pub struct Query<T> {
  data: Option<T>,
  status: QueryStatus,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  fetched_at: Option<Instant>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a query; nothing runs until `fetch()`
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      data: None,
      status: QueryStatus::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      fetched_at: None,
    }
  }

  pub fn status(&self) -> &QueryStatus {
    &self.status
  }

  /// Data from the last successful fetch
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// Local edits (e.g. dropping a deleted row before the refetch lands)
  pub fn data_mut(&mut self) -> Option<&mut T> {
    self.data.as_mut()
  }

  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading
  }

  pub fn error(&self) -> Option<&str> {
    match &self.status {
      QueryStatus::Failed(e) => Some(e),
      _ => None,
    }
  }

  /// Time since the last successful fetch
  pub fn age(&self) -> Option<Duration> {
    self.fetched_at.map(|t| t.elapsed())
  }

  /// Start fetching unless a fetch is already in flight
  pub fn fetch(&mut self) {
    if self.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Start a new fetch; the result of any in-flight one is discarded
  pub fn refetch(&mut self) {
    self.receiver = None;
    self.start_fetch();
  }

  /// Pick up a finished fetch. Returns `true` when the status changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = self.receiver.as_mut() else {
      return false;
    };

    let outcome = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Request was cancelled".to_string()),
    };
    self.receiver = None;

    match outcome {
      Ok(data) => {
        self.data = Some(data);
        self.fetched_at = Some(Instant::now());
        self.status = QueryStatus::Ready;
      }
      Err(error) => self.status = QueryStatus::Failed(error),
    }
    true
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = QueryStatus::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver is gone if the query was refetched or dropped
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("data", &self.data)
      .field("fetched_at", &self.fetched_at)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;

  async fn settle<T: Send + 'static>(query: &mut Query<T>) -> bool {
    tokio::time::sleep(Duration::from_millis(20)).await;
    query.poll()
  }

  #[tokio::test]
  async fn test_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });
    assert_eq!(query.status(), &QueryStatus::Idle);

    query.fetch();
    assert!(query.is_loading());

    assert!(settle(&mut query).await);
    assert_eq!(query.status(), &QueryStatus::Ready);
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
    assert!(query.age().is_some());
  }

  #[tokio::test]
  async fn test_failure() {
    let mut query: Query<i32> = Query::new(|| async { Err("502 Bad Gateway".to_string()) });

    query.fetch();
    assert!(settle(&mut query).await);
    assert_eq!(query.error(), Some("502 Bad Gateway"));
    assert!(query.data().is_none());
  }

  #[tokio::test]
  async fn test_failed_refetch_keeps_data() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Ok(7)
        } else {
          Err("timeout".to_string())
        }
      }
    });

    query.fetch();
    settle(&mut query).await;
    query.refetch();
    assert!(query.is_loading());
    assert_eq!(query.data(), Some(&7));

    settle(&mut query).await;
    assert_eq!(query.error(), Some("timeout"));
    assert_eq!(query.data(), Some(&7));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, String>(())
      }
    });

    query.fetch();
    query.fetch();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_refetch_discards_pending() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok::<_, String>(n)
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(5)).await;
    query.refetch();
    tokio::time::sleep(Duration::from_millis(80)).await;

    query.poll();
    assert_eq!(query.data(), Some(&1));
  }

  #[tokio::test]
  async fn test_data_mut() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec!["a", "b"]) });
    query.fetch();
    settle(&mut query).await;

    query.data_mut().unwrap().retain(|s| *s != "a");
    assert_eq!(query.data(), Some(&vec!["b"]));
  }
}
