//! Single-flight refresh coordination
//!
//! At most one token refresh may be in flight per client. The first request
//! to hit a 401 becomes the leader and performs the refresh; every other
//! request that fails while the cycle is open parks on the queue and is
//! settled with the cycle's outcome, in enqueue order.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of a refresh cycle, fanned out to every queued waiter.
///
/// `Ok` carries the new access token; `Err` carries the refresh failure
/// message the waiter surfaces as a session-expired error.
pub(crate) type RefreshOutcome = std::result::Result<String, String>;

/// How a request joins the current refresh cycle
pub(crate) enum RefreshEntry {
    /// No cycle was open; the caller must run the refresh and settle the permit
    Leader(RefreshPermit),
    /// A cycle is in flight; await its outcome
    Follower(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
struct RefreshState {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Per-client gate serializing token refreshes
///
/// The mutex is only ever held for synchronous bookkeeping, never across an
/// await, so marking `in_progress` before the leader's first suspension point
/// is enough to exclude a second concurrent refresh.
#[derive(Clone, Default)]
pub(crate) struct RefreshCoordinator {
    state: Arc<Mutex<RefreshState>>,
}

impl RefreshCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Join the current refresh cycle, opening one if none is in flight
    pub(crate) fn join(&self) -> RefreshEntry {
        let mut state = self.lock();
        if state.in_progress {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            debug!(queued = state.waiters.len(), "queued behind in-flight token refresh");
            RefreshEntry::Follower(rx)
        } else {
            state.in_progress = true;
            RefreshEntry::Leader(RefreshPermit {
                state: Arc::clone(&self.state),
                settled: false,
            })
        }
    }

    /// Whether a refresh cycle is currently open
    pub(crate) fn in_progress(&self) -> bool {
        self.lock().in_progress
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        // A panic while holding the lock is a bug in this module; the short
        // critical sections contain no panicking operations.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Exclusive handle held by the request running the refresh
///
/// `settle` closes the cycle: it releases the gate and delivers the outcome
/// to every waiter in FIFO order. Dropping an unsettled permit (early return,
/// panic unwinding through the refresh call) also releases the gate and fails
/// the queue, so the gate can never be left permanently closed.
pub(crate) struct RefreshPermit {
    state: Arc<Mutex<RefreshState>>,
    settled: bool,
}

impl RefreshPermit {
    /// Close the cycle and fan the outcome out to all queued waiters
    pub(crate) fn settle(mut self, outcome: &RefreshOutcome) {
        self.release(outcome);
        self.settled = true;
    }

    fn release(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.in_progress = false;
            std::mem::take(&mut state.waiters)
        };

        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "refresh cycle settled");
        for waiter in waiters {
            // A waiter that stopped listening is dropped silently
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshPermit {
    fn drop(&mut self) {
        if !self.settled {
            self.release(&Err("token refresh aborted".to_string()));
        }
    }
}
