//! Lifetime-scoped background tasks
//!
//! A `TaskScope` belongs to one owner (a view-model). Work spawned on it
//! stops when the scope is cancelled, and the owner can wait for everything
//! spawned so far to finish.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub struct TaskScope {
    name: &'static str,
    tracker: TaskTracker,
    token: CancellationToken,
}

impl TaskScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            tracker: TaskTracker::new(),
            token: CancellationToken::new(),
        }
    }

    /// Run `future` in the background until it completes or the scope is cancelled.
    ///
    /// Returns `None` from the handle when the task was cancelled.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let token = self.token.clone();
        let name = self.name;

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    tracing::debug!("Task in scope {} cancelled", name);
                    None
                }
                output = future => Some(output),
            }
        })
    }

    /// Wait for every task spawned so far. The scope stays usable afterwards.
    pub async fn settle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Cancel pending and running tasks; later spawns finish immediately
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(
                "Cancelling task scope {} ({} tasks)",
                self.name,
                self.tracker.len()
            );
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Number of tasks that have not finished yet
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
