//! # In-memory rate-limiting work queue.
//!
//! [`RateLimitingQueue`] is the default [`WorkQueue`]. It tracks three sets:
//!
//! ```text
//!            add(k)                         get()                      done(k)
//! producer ─────────► dirty ∪ queue ───────────────► processing ───────────────► (gone)
//!                       ▲   (FIFO, deduped)            │ add(k) while processing
//!                       │                              ▼
//!                       └──────────────────────── dirty only, requeued on done(k)
//!
//! add_after(k, d)      → timer task ─► add(k)        (timers cancelled on shutdown)
//! add_with_backoff(k)  → add_after(k, limiter.when(k))
//! ```
//!
//! ## Rules
//! - A key is stored at most once in `queue`; repeated adds coalesce.
//! - A key in `processing` is never handed out again until `done`.
//! - After `shut_down`: adds are ignored, queued keys still drain, then `get` returns `None`.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::key::Key;
use super::rate_limiter::{ExponentialFailureRateLimiter, RateLimiter};
use super::work_queue::WorkQueue;
use crate::config::Config;
use crate::policies::BackoffPolicy;

#[derive(Default)]
struct State {
    queue: VecDeque<Key>,
    dirty: HashSet<Key>,
    processing: HashSet<Key>,
    shutting_down: bool,
}

/// Deduplicating FIFO queue with in-flight tracking and per-key backoff.
///
/// Always handed out as `Arc<RateLimitingQueue>`: delayed adds hold a weak
/// reference back to the queue.
///
/// Delayed adds (`add_after`, `add_with_backoff`) run on a tokio timer. Called
/// outside a tokio runtime, they cannot be delayed and add the key immediately
/// (logged at warn); the failure count is still recorded.
///
/// # Example
/// ```
/// use reconvisor::{Key, RateLimitingQueue, WorkQueue};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = RateLimitingQueue::with_backoff(Default::default());
/// queue.add(Key::from("default/a"));
/// queue.add(Key::from("default/a"));
/// assert_eq!(queue.len(), 1);
///
/// let key = queue.get().await.unwrap();
/// queue.forget(&key);
/// queue.done(&key);
///
/// queue.shut_down();
/// assert!(queue.get().await.is_none());
/// # }
/// ```
pub struct RateLimitingQueue {
    me: Weak<RateLimitingQueue>,
    state: Mutex<State>,
    notify: Notify,
    limiter: Box<dyn RateLimiter>,
    timers: CancellationToken,
}

impl RateLimitingQueue {
    /// Creates a queue using the given rate limiter for backoff requeues.
    pub fn new(limiter: impl RateLimiter) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            state: Mutex::new(State::default()),
            notify: Notify::new(),
            limiter: Box::new(limiter),
            timers: CancellationToken::new(),
        })
    }

    /// Creates a queue with exponential per-key backoff.
    pub fn with_backoff(backoff: BackoffPolicy) -> Arc<Self> {
        Self::new(ExponentialFailureRateLimiter::new(backoff))
    }

    /// Creates a queue with the backoff configured in `cfg`.
    pub fn from_config(cfg: &Config) -> Arc<Self> {
        Self::with_backoff(cfg.backoff)
    }

    /// Adds `key` after `delay` on a timer task; immediately when no runtime is available.
    fn schedule(&self, key: Key, delay: Duration) {
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(%key, ?delay, "no tokio runtime for delayed add; adding immediately");
            self.add(key);
            return;
        };

        let me = self.me.clone();
        let cancelled = self.timers.clone();
        rt.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(queue) = me.upgrade() {
                        queue.add(key);
                    }
                }
            }
        });
    }
}

#[async_trait]
impl WorkQueue for RateLimitingQueue {
    fn add(&self, key: Key) {
        let mut st = self.state.lock();
        if st.shutting_down || st.dirty.contains(&key) {
            return;
        }
        st.dirty.insert(key.clone());
        if st.processing.contains(&key) {
            return;
        }
        st.queue.push_back(key);
        drop(st);
        self.notify.notify_one();
    }

    fn add_after(&self, key: Key, delay: Duration) {
        if self.is_shutting_down() {
            return;
        }
        if delay.is_zero() {
            self.add(key);
            return;
        }
        self.schedule(key, delay);
    }

    fn add_with_backoff(&self, key: Key) {
        if self.is_shutting_down() {
            return;
        }
        let delay = self.limiter.when(&key);
        self.add_after(key, delay);
    }

    async fn get(&self) -> Option<Key> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a concurrent shut_down cannot be missed.
            notified.as_mut().enable();

            {
                let mut st = self.state.lock();
                if let Some(key) = st.queue.pop_front() {
                    st.dirty.remove(&key);
                    st.processing.insert(key.clone());
                    return Some(key);
                }
                if st.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    fn done(&self, key: &Key) {
        let mut st = self.state.lock();
        st.processing.remove(key);
        if st.dirty.contains(key) {
            st.queue.push_back(key.clone());
            drop(st);
            self.notify.notify_one();
        }
    }

    fn forget(&self, key: &Key) {
        self.limiter.forget(key);
    }

    fn num_requeues(&self, key: &Key) -> u32 {
        self.limiter.num_requeues(key)
    }

    fn shut_down(&self) {
        self.state.lock().shutting_down = true;
        self.timers.cancel();
        self.notify.notify_waiters();
    }

    fn is_shutting_down(&self) -> bool {
        self.state.lock().shutting_down
    }

    fn len(&self) -> usize {
        self.state.lock().queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::JitterPolicy;

    fn queue() -> Arc<RateLimitingQueue> {
        RateLimitingQueue::with_backoff(BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: JitterPolicy::None,
        })
    }

    #[tokio::test]
    async fn pending_keys_are_deduplicated() {
        let q = queue();
        q.add(Key::from("a"));
        q.add(Key::from("a"));
        q.add(Key::from("b"));
        assert_eq!(q.len(), 2);

        assert_eq!(q.get().await, Some(Key::from("a")));
        assert_eq!(q.get().await, Some(Key::from("b")));
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn key_added_while_processing_waits_for_done() {
        let q = queue();
        q.add(Key::from("a"));
        let key = q.get().await.unwrap();

        q.add(Key::from("a"));
        assert!(q.is_empty(), "in-flight key must not be handed out twice");

        q.done(&key);
        assert_eq!(q.len(), 1);
        assert_eq!(q.get().await, Some(Key::from("a")));
    }

    #[tokio::test]
    async fn shutdown_drains_then_reports_none() {
        let q = queue();
        q.add(Key::from("a"));
        q.shut_down();
        q.add(Key::from("late"));

        assert_eq!(q.get().await, Some(Key::from("a")));
        assert_eq!(q.get().await, None);
        assert_eq!(q.get().await, None);
    }

    #[tokio::test]
    async fn blocked_getters_wake_on_shutdown() {
        let q = queue();
        let mut waiters = tokio::task::JoinSet::new();
        for _ in 0..3 {
            let q = Arc::clone(&q);
            waiters.spawn(async move { q.get().await });
        }
        tokio::task::yield_now().await;

        q.shut_down();
        while let Some(res) = waiters.join_next().await {
            assert_eq!(res.unwrap(), None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_requeue_becomes_available_after_delay() {
        let q = queue();
        let key = Key::from("b");

        q.add_with_backoff(key.clone());
        assert!(q.is_empty());
        assert_eq!(q.num_requeues(&key), 1);

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(q.is_empty());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(q.len(), 1);

        q.forget(&key);
        assert_eq!(q.num_requeues(&key), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_timers_are_dropped_on_shutdown() {
        let q = queue();
        q.add_after(Key::from("a"), Duration::from_secs(1));
        q.shut_down();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(q.is_empty());
        assert_eq!(q.get().await, None);
    }

    #[test]
    fn delayed_add_without_runtime_is_immediate() {
        let q = queue();
        let key = Key::from("c");

        q.add_with_backoff(key.clone());
        assert_eq!(q.len(), 1);
        assert_eq!(q.num_requeues(&key), 1);
    }
}
