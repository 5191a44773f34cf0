//! Termination detection for the worker pool
//!
//! A single shared counter tracks tasks that have been produced but not yet
//! fully processed. Every unit of that count is owned by a [`WorkTicket`]:
//! issuing a ticket increments the counter and dropping it decrements. The
//! ticket travels with its task through the hand-off channel and is held by
//! the worker until every link discovered on the page has been considered, so
//!
//! - a task is counted before any worker can see it, and
//! - a finished task releases its count only after its follow-on tasks hold theirs.
//!
//! Release happens on every exit path (success, failure, cancellation,
//! a dropped channel message) because it lives in `Drop`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared outstanding-work counter
///
/// When the count drops from one to zero the `quiescent` token is cancelled,
/// which is the signal for every worker to stop.
#[derive(Debug)]
pub struct WorkCounter {
    outstanding: AtomicUsize,
    drained: AtomicBool,
    quiescent: CancellationToken,
}

impl WorkCounter {
    /// Creates a counter at zero that cancels `quiescent` when work runs out
    pub fn new(quiescent: CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            outstanding: AtomicUsize::new(0),
            drained: AtomicBool::new(false),
            quiescent,
        })
    }

    /// Counts one more outstanding task and returns the ticket that owns it
    pub fn issue(self: &Arc<Self>) -> WorkTicket {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        WorkTicket {
            counter: Arc::clone(self),
        }
    }

    /// Number of tasks currently outstanding
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Returns true if the count reached zero before anything else stopped the crawl
    pub fn is_drained(&self) -> bool {
        self.drained.load(Ordering::Acquire)
    }

    fn release(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "outstanding work counter went negative");

        if previous == 1 {
            if !self.quiescent.is_cancelled() {
                self.drained.store(true, Ordering::Release);
                tracing::debug!("outstanding work reached zero");
            }
            self.quiescent.cancel();
        }
    }
}

/// Ownership of one unit of outstanding work
///
/// Not `Clone`: each ticket decrements the counter exactly once.
#[derive(Debug)]
#[must_use = "dropping a work ticket immediately marks its task as finished"]
pub struct WorkTicket {
    counter: Arc<WorkCounter>,
}

impl Drop for WorkTicket {
    fn drop(&mut self) {
        self.counter.release();
    }
}
