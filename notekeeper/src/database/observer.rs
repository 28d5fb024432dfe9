//! Table change tracking and live queries
//!
//! Writes bump a generation counter on the `InvalidationTracker`. Each
//! `LiveQuery` owns a background task that re-runs its query whenever the
//! counter moves and publishes the result as the newest snapshot.

use crate::error::{AppError, Result};
use std::future::Future;
use tokio::sync::watch;

/// Broadcasts "the notes table changed" to live queries
#[derive(Clone)]
pub struct InvalidationTracker {
    generation: watch::Sender<u64>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self { generation }
    }

    /// Mark the table as changed
    pub fn notify(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Number of changes seen since creation
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }
}

impl Default for InvalidationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a query result that refreshes after every table change.
///
/// Cloning shares the same refresh task. The task stops once every handle
/// has been dropped.
#[derive(Clone)]
pub struct LiveQuery<T> {
    snapshots: watch::Receiver<Option<T>>,
}

impl<T> LiveQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a live query. Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(tracker: &InvalidationTracker, name: &'static str, query: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let mut invalidations = tracker.subscribe();

        tokio::spawn(async move {
            tracing::debug!("Live query {} started", name);

            loop {
                invalidations.borrow_and_update();

                match query().await {
                    Ok(value) => {
                        if tx.send(Some(value)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!("Live query {} failed: {}", name, e),
                }

                tokio::select! {
                    changed = invalidations.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    () = tx.closed() => break,
                }
            }

            tracing::debug!("Live query {} stopped", name);
        });

        Self { snapshots: rx }
    }

    /// Most recent snapshot, `None` until the first load completes
    pub fn latest(&self) -> Option<T> {
        self.snapshots.borrow().clone()
    }

    /// Wait for a snapshot this handle has not seen yet
    pub async fn next(&mut self) -> Result<T> {
        loop {
            self.snapshots
                .changed()
                .await
                .map_err(|_| AppError::ChannelClosed)?;

            if let Some(value) = self.snapshots.borrow_and_update().clone() {
                return Ok(value);
            }
        }
    }

    /// Wait until a snapshot satisfies `predicate`, checking the current one first
    pub async fn wait_for<P>(&mut self, mut predicate: P) -> Result<T>
    where
        P: FnMut(&T) -> bool,
    {
        let snapshot = self
            .snapshots
            .wait_for(|value| value.as_ref().is_some_and(&mut predicate))
            .await
            .map_err(|_| AppError::ChannelClosed)?;

        (*snapshot).clone().ok_or(AppError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_query(
        tracker: &InvalidationTracker,
        runs: Arc<AtomicUsize>,
    ) -> LiveQuery<usize> {
        LiveQuery::spawn(tracker, "counter", move || {
            let runs = Arc::clone(&runs);
            async move { Ok(runs.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_loaded() {
        let tracker = InvalidationTracker::new();
        let mut live = counting_query(&tracker, Arc::new(AtomicUsize::new(0)));

        let first = live.wait_for(|_| true).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(live.latest(), Some(1));
    }

    #[tokio::test]
    async fn test_notify_reruns_query() {
        let tracker = InvalidationTracker::new();
        let mut live = counting_query(&tracker, Arc::new(AtomicUsize::new(0)));
        live.wait_for(|runs| *runs == 1).await.unwrap();

        tracker.notify();

        let second = live.wait_for(|runs| *runs >= 2).await.unwrap();
        assert!(second >= 2);
        assert_eq!(tracker.generation(), 1);
    }

    #[tokio::test]
    async fn test_failed_query_keeps_previous_snapshot() {
        let tracker = InvalidationTracker::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut live = LiveQuery::spawn(&tracker, "flaky", move || {
            let counter = Arc::clone(&counter);
            async move {
                match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => Ok("first".to_string()),
                    1 => Err(AppError::Generic("disk unplugged".to_string())),
                    _ => Ok("third".to_string()),
                }
            }
        });
        live.wait_for(|s| s == "first").await.unwrap();

        tracker.notify();
        while runs.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(live.latest().as_deref(), Some("first"));

        tracker.notify();
        let recovered = live.wait_for(|s| s == "third").await.unwrap();
        assert_eq!(recovered, "third");
    }

    #[tokio::test]
    async fn test_next_errors_when_tracker_dropped() {
        let tracker = InvalidationTracker::new();
        let mut live = counting_query(&tracker, Arc::new(AtomicUsize::new(0)));
        live.wait_for(|_| true).await.unwrap();

        drop(tracker);

        assert!(matches!(live.next().await, Err(AppError::ChannelClosed)));
    }
}
