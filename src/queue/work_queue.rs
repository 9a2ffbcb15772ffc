//! # Work queue contract consumed by controller workers.
//!
//! The engine never deduplicates, schedules backoff or tracks in-flight keys
//! itself. It relies on a [`WorkQueue`] for all three and only guarantees it
//! calls the operations in the right order:
//!
//! ```text
//! get() ──► Some(key) ──► handler ──┬─ Ok  ──► forget(key) ─► done(key)
//!                                   └─ Err ──► done(key) ──► add_with_backoff(key)
//! get() ──► None  ──► worker exits
//! ```
//!
//! ## Required guarantees
//! - **Dedup**: a key pending in the queue is stored once, however many times it is added.
//! - **In-flight exclusion**: a key handed out by `get` is not handed out again until `done`.
//!   This is what keeps one key on at most one worker at a time.
//! - **Shutdown**: after `shut_down`, adds are ignored, remaining keys are still handed out,
//!   and once empty every blocked or future `get` returns `None`.
//! - **Thread safety**: every method may be called concurrently from any worker.

use std::time::Duration;

use async_trait::async_trait;

use super::key::Key;

/// Deduplicating, backoff-aware queue of reconciliation keys.
#[async_trait]
pub trait WorkQueue: Send + Sync + 'static {
    /// Makes `key` available immediately. No-op if already pending or after shutdown.
    fn add(&self, key: Key);

    /// Makes `key` available after `delay`. No-op after shutdown.
    fn add_after(&self, key: Key, delay: Duration);

    /// Makes `key` available after a delay that grows with its consecutive failures.
    fn add_with_backoff(&self, key: Key);

    /// Waits for the next key. `None` means the queue is shut down and drained.
    async fn get(&self) -> Option<Key>;

    /// Releases the in-flight lock taken by [`get`](Self::get).
    fn done(&self, key: &Key);

    /// Resets the failure history of `key`.
    fn forget(&self, key: &Key);

    /// Number of consecutive backoff requeues recorded for `key`.
    fn num_requeues(&self, key: &Key) -> u32;

    /// Stops accepting new work and wakes every waiter.
    fn shut_down(&self);

    /// True once [`shut_down`](Self::shut_down) has been called.
    fn is_shutting_down(&self) -> bool;

    /// Number of keys ready to be handed out.
    fn len(&self) -> usize;

    /// True when no key is ready to be handed out.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
