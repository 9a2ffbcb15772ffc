//! # Per-key rate limiting for requeues.
//!
//! A [`RateLimiter`] decides how long a failed key waits before it is
//! retried. [`ExponentialFailureRateLimiter`] counts consecutive failures per key
//! and feeds the count into a [`BackoffPolicy`].
//!
//! ```text
//! when(k) → delay = backoff.next(failures[k]); failures[k] += 1
//! forget(k) → failures.remove(k)
//! ```

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use super::key::Key;
use crate::policies::BackoffPolicy;

/// Decides requeue delays for failed keys.
pub trait RateLimiter: Send + Sync + 'static {
    /// Records one more failure of `key` and returns the delay before its retry.
    fn when(&self, key: &Key) -> Duration;

    /// Clears the failure history of `key`.
    fn forget(&self, key: &Key);

    /// Number of failures recorded for `key` since the last `forget`.
    fn num_requeues(&self, key: &Key) -> u32;
}

/// Exponential per-key backoff driven by a [`BackoffPolicy`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use reconvisor::{BackoffPolicy, ExponentialFailureRateLimiter, Key, RateLimiter};
///
/// let limiter = ExponentialFailureRateLimiter::new(BackoffPolicy::default());
/// let key = Key::from("default/web");
///
/// assert_eq!(limiter.when(&key), Duration::from_millis(5));
/// assert_eq!(limiter.when(&key), Duration::from_millis(10));
/// assert_eq!(limiter.num_requeues(&key), 2);
///
/// limiter.forget(&key);
/// assert_eq!(limiter.when(&key), Duration::from_millis(5));
/// ```
#[derive(Debug)]
pub struct ExponentialFailureRateLimiter {
    backoff: BackoffPolicy,
    failures: Mutex<HashMap<Key, u32>>,
}

impl ExponentialFailureRateLimiter {
    /// Creates a limiter with no recorded failures.
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self {
            backoff,
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the backoff policy in use.
    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }
}

impl Default for ExponentialFailureRateLimiter {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl RateLimiter for ExponentialFailureRateLimiter {
    fn when(&self, key: &Key) -> Duration {
        let failures = {
            let mut map = self.failures.lock();
            let count = map.entry(key.clone()).or_insert(0);
            let prev = *count;
            *count = count.saturating_add(1);
            prev
        };
        self.backoff.next(failures)
    }

    fn forget(&self, key: &Key) {
        self.failures.lock().remove(key);
    }

    fn num_requeues(&self, key: &Key) -> u32 {
        self.failures.lock().get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::JitterPolicy;

    #[test]
    fn consecutive_failures_never_shrink_delay() {
        let limiter = ExponentialFailureRateLimiter::default();
        let key = Key::from("b");

        let delays: Vec<Duration> = (0..3).map(|_| limiter.when(&key)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]), "{delays:?}");
        assert_eq!(limiter.num_requeues(&key), 3);
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = ExponentialFailureRateLimiter::new(BackoffPolicy {
            first: Duration::from_millis(10),
            max: Duration::from_secs(1),
            factor: 3.0,
            jitter: JitterPolicy::None,
        });
        let a = Key::from("a");
        let b = Key::from("b");

        limiter.when(&a);
        limiter.when(&a);
        assert_eq!(limiter.when(&b), Duration::from_millis(10));
        assert_eq!(limiter.when(&a), Duration::from_millis(90));
    }

    #[test]
    fn forget_unknown_key_is_noop() {
        let limiter = ExponentialFailureRateLimiter::default();
        limiter.forget(&Key::from("missing"));
        assert_eq!(limiter.num_requeues(&Key::from("missing")), 0);
    }
}
