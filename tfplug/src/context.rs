//! Request-scoped cancellation and deadlines
//!
//! Every resource operation receives a `Context`. Long running work such as
//! the create retry loop derives a child context with a deadline and stops
//! once it is done.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Context carries cancellation and deadline information across async calls
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        Self {
            inner: Arc::new(ContextInner {
                deadline: None,
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Derive a child context that is done after `timeout` or when the
    /// parent is done, whichever comes first. Must be called inside a tokio
    /// runtime.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut deadline = Instant::now() + timeout;
        if let Some(parent) = self.inner.deadline {
            deadline = deadline.min(parent);
        }

        let (done_tx, done_rx) = watch::channel(*self.inner.done.borrow());

        let child_tx = done_tx.clone();
        let parent_done = self.done();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline.into()) => {}
                _ = wait_done(parent_done) => {}
                _ = child_tx.closed() => return,
            }
            let _ = child_tx.send(true);
        });

        Self {
            inner: Arc::new(ContextInner {
                deadline: Some(deadline),
                done: done_rx,
                done_tx,
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow() || self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns a receiver that flips to `true` when work done on behalf of
    /// this context should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

async fn wait_done(mut done: watch::Receiver<bool>) {
    loop {
        let is_done = *done.borrow_and_update();
        if is_done {
            return;
        }
        if done.changed().await.is_err() {
            // The sender is gone without cancelling, so this never completes
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
