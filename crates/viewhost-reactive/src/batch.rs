#![forbid(unsafe_code)]

//! Deferred notification scopes.
//!
//! While a [`BatchScope`] is alive on the current thread, [`Observable::set`]
//! updates values immediately but queues the notification. Each observable
//! is queued at most once per batch; its subscribers see the value current
//! at flush time. Nested scopes are supported and only the outermost one
//! flushes.
//!
//! Batching two inputs of a [`combine_latest`] means its callback sees the
//! final pair on the first notification, and the second notification sees
//! the same pair again (which [`distinct_pairs`] drops).
//!
//! [`Observable::set`]: crate::Observable::set
//! [`combine_latest`]: crate::combine_latest
//! [`distinct_pairs`]: crate::distinct_pairs

use std::cell::RefCell;

type Deferred = Box<dyn FnOnce()>;

#[derive(Default)]
struct BatchState {
    depth: usize,
    pending: Vec<(usize, Deferred)>,
}

thread_local! {
    static BATCH: RefCell<BatchState> = RefCell::new(BatchState::default());
}

pub(crate) fn is_batching() -> bool {
    BATCH.with(|b| b.borrow().depth > 0)
}

pub(crate) fn defer(key: usize, notify: impl FnOnce() + 'static) {
    BATCH.with(|b| {
        let mut state = b.borrow_mut();
        if state.pending.iter().any(|(k, _)| *k == key) {
            return;
        }
        state.pending.push((key, Box::new(notify)));
    });
}

/// RAII guard that defers observable notifications until it drops.
#[must_use = "notifications flush as soon as the BatchScope drops"]
pub struct BatchScope {
    _private: (),
}

impl BatchScope {
    /// Open a batch on the current thread.
    pub fn new() -> Self {
        BATCH.with(|b| b.borrow_mut().depth += 1);
        Self { _private: () }
    }

    /// Number of notifications currently queued on this thread.
    #[must_use]
    pub fn pending() -> usize {
        BATCH.with(|b| b.borrow().pending.len())
    }
}

impl Default for BatchScope {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("pending", &Self::pending())
            .finish()
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        let flush = BATCH.with(|b| {
            let mut state = b.borrow_mut();
            state.depth -= 1;
            if state.depth == 0 {
                std::mem::take(&mut state.pending)
            } else {
                Vec::new()
            }
        });
        if !flush.is_empty() {
            tracing::trace!(count = flush.len(), "flushing batched notifications");
        }
        for (_, notify) in flush {
            notify();
        }
    }
}
