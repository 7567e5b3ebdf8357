// Generic async state container around one server-fetched collection.
// Every list the app shows goes through one of these: uniform
// Idle/Loading/Success/Error lifecycle, fetch-once memoization and a
// single-flight guarantee per instance.

use std::future::Future;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceState<T> {
    Idle,
    Loading,
    Success(T),
    Error(TransportError),
}

impl<T> ResourceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            ResourceState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            ResourceState::Error(err) => Some(err),
            _ => None,
        }
    }
}

// Bookkeeping behind the published state. The generation counter tags every
// issued fetch so a stale completion can never overwrite a newer one.
struct Book {
    generation: u64,
    in_flight: bool,
    fetched_once: bool,
    last_fetched_at: Option<DateTime<Utc>>,
}

pub struct ResourceCache<T: Clone> {
    label: &'static str,
    book: Mutex<Book>,
    tx: watch::Sender<ResourceState<T>>,
}

impl<T: Clone> ResourceCache<T> {
    pub fn new(label: &'static str) -> Self {
        let (tx, _rx) = watch::channel(ResourceState::Idle);
        Self {
            label,
            book: Mutex::new(Book {
                generation: 0,
                in_flight: false,
                fetched_once: false,
                last_fetched_at: None,
            }),
            tx,
        }
    }

    // Drive one fetch through the lifecycle.
    //
    // With `force == false`, a call while a fetch is already in flight
    // coalesces into it (no second transport call), and a call after a
    // success serves the memoized value. With `force == true` the cache
    // always re-enters Loading; if that supersedes an in-flight call, the
    // older completion is discarded when it eventually lands.
    //
    // The loader is only invoked when a call is actually issued. Returns the
    // latest observable state.
    pub async fn fetch_with<F, Fut>(&self, force: bool, load: F) -> ResourceState<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let my_generation = {
            let mut book = self.book.lock();
            if !force {
                if book.in_flight {
                    debug!("{}: fetch coalesced into in-flight call", self.label);
                    return self.current();
                }
                if book.fetched_once {
                    let current = self.current();
                    if current.success().is_some() {
                        debug!("{}: serving memoized result", self.label);
                        return current;
                    }
                }
            }
            book.generation += 1;
            book.in_flight = true;
            self.tx.send_replace(ResourceState::Loading);
            book.generation
        };

        debug!("{}: fetch started (generation {})", self.label, my_generation);
        let result = load().await;

        let mut book = self.book.lock();
        if book.generation != my_generation {
            debug!(
                "{}: discarding stale completion (generation {})",
                self.label, my_generation
            );
            return self.current();
        }
        book.in_flight = false;

        let state = match result {
            Ok(value) => {
                book.fetched_once = true;
                book.last_fetched_at = Some(Utc::now());
                ResourceState::Success(value)
            }
            Err(err) => {
                warn!("{}: fetch failed: {}", self.label, err);
                ResourceState::Error(err)
            }
        };
        self.tx.send_replace(state.clone());
        state
    }

    // Back to Idle, forgetting the has-ever-succeeded flag. Any in-flight
    // completion is orphaned by the generation bump.
    pub fn reset(&self) {
        let mut book = self.book.lock();
        book.generation += 1;
        book.in_flight = false;
        book.fetched_once = false;
        book.last_fetched_at = None;
        self.tx.send_replace(ResourceState::Idle);
    }

    pub fn current(&self) -> ResourceState<T> {
        self.tx.borrow().clone()
    }

    // Latest-value observation; a newly attached observer sees only the
    // current state, never a replay.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.tx.subscribe()
    }

    pub fn has_loaded(&self) -> bool {
        self.book.lock().fetched_once
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.book.lock().last_fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        value: Vec<u32>,
        delay: Duration,
    ) -> impl Future<Output = Result<Vec<u32>, TransportError>> {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            if !delay.is_zero() {
                sleep(delay).await;
            }
            Ok(value)
        }
    }

    #[tokio::test]
    async fn concurrent_fetches_issue_one_transport_call() {
        let cache = Arc::new(ResourceCache::new("numbers"));
        let calls = Arc::new(AtomicUsize::new(0));

        let background = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .fetch_with(false, || {
                        counting_loader(&calls, vec![1], Duration::from_millis(40))
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(10)).await;

        // Second caller observes the in-flight Loading state.
        let second = cache
            .fetch_with(false, || counting_loader(&calls, vec![2], Duration::ZERO))
            .await;
        assert!(second.is_loading());

        let first = background.await.expect("task panicked");
        assert_eq!(first, ResourceState::Success(vec![1]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_once_serves_memoized_value() {
        let cache = ResourceCache::new("numbers");
        let calls = Arc::new(AtomicUsize::new(0));

        let state = cache
            .fetch_with(false, || counting_loader(&calls, vec![7], Duration::ZERO))
            .await;
        assert_eq!(state, ResourceState::Success(vec![7]));

        // Repeated mount: no network call, cached value returned.
        let state = cache
            .fetch_with(false, || counting_loader(&calls, vec![8], Duration::ZERO))
            .await;
        assert_eq!(state, ResourceState::Success(vec![7]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Explicit refresh re-enters the lifecycle.
        let state = cache
            .fetch_with(true, || counting_loader(&calls, vec![8], Duration::ZERO))
            .await;
        assert_eq!(state, ResourceState::Success(vec![8]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_error_state() {
        let cache: ResourceCache<Vec<u32>> = ResourceCache::new("numbers");
        let state = cache
            .fetch_with(false, || async {
                Err(TransportError::Network("connection refused".to_string()))
            })
            .await;
        assert_eq!(
            state.error().map(|e| e.to_string()),
            Some("network error: connection refused".to_string())
        );
        assert!(!cache.has_loaded());

        // An error does not count as fetched-once: the next plain fetch
        // retries.
        let state = cache.fetch_with(false, || async { Ok(vec![3]) }).await;
        assert_eq!(state, ResourceState::Success(vec![3]));
    }

    #[tokio::test]
    async fn reset_clears_memoization_and_returns_to_idle() {
        let cache = ResourceCache::new("numbers");
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch_with(false, || counting_loader(&calls, vec![1], Duration::ZERO))
            .await;
        assert!(cache.has_loaded());
        assert!(cache.last_fetched_at().is_some());

        cache.reset();
        assert_eq!(cache.current(), ResourceState::Idle);
        assert!(!cache.has_loaded());
        assert!(cache.last_fetched_at().is_none());

        // A fresh non-forced fetch issues a new transport call.
        cache
            .fetch_with(false, || counting_loader(&calls, vec![2], Duration::ZERO))
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superseding_force_fetch_discards_stale_completion() {
        let cache = Arc::new(ResourceCache::new("numbers"));
        let calls = Arc::new(AtomicUsize::new(0));

        let slow = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .fetch_with(false, || {
                        counting_loader(&calls, vec![1], Duration::from_millis(60))
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(10)).await;

        let fast = cache
            .fetch_with(true, || counting_loader(&calls, vec![2], Duration::ZERO))
            .await;
        assert_eq!(fast, ResourceState::Success(vec![2]));

        // The slow call completes later but must not overwrite the newer
        // result.
        let slow = slow.await.expect("task panicked");
        assert_eq!(slow, ResourceState::Success(vec![2]));
        assert_eq!(cache.current(), ResourceState::Success(vec![2]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn observers_see_the_latest_state_only() {
        let cache = ResourceCache::new("numbers");
        cache.fetch_with(false, || async { Ok(vec![5]) }).await;

        let rx = cache.subscribe();
        assert_eq!(*rx.borrow(), ResourceState::Success(vec![5]));
    }
}
