//! # Backoff policy for requeued keys.
//!
//! [`BackoffPolicy`] turns the number of consecutive failures recorded for a key
//! into the delay before that key becomes available in the queue again.
//! It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first failure;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the cap no delay may exceed.
//!
//! The delay after `n` previous failures is `first × factor^n`, clamped to `max`,
//! then jitter is applied. The base is derived from the failure count alone, so a
//! jittered delay never feeds back into the next one.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use reconvisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(5),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(5));
//! assert_eq!(backoff.next(3), Duration::from_millis(40));
//! assert_eq!(backoff.next(20), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Per-key exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay applied after the first failure.
    pub first: Duration,
    /// Upper bound for any computed delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` keeps delays non-decreasing).
    pub factor: f64,
    /// Randomization applied on top of the computed base.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Item-level defaults of a controller queue:
    /// - `first = 5ms`;
    /// - `factor = 2.0`;
    /// - `max = 1000s`;
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(5),
            max: Duration::from_secs(1000),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for a key that has already failed `failures` times.
    ///
    /// Overflowing, negative or non-finite intermediate values clamp to [`BackoffPolicy::max`].
    pub fn next(&self, failures: u32) -> Duration {
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn exponential(first_ms: u64, max: Duration) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn first_failure_uses_first_delay() {
        let policy = exponential(5, Duration::from_secs(1000));
        assert_eq!(policy.next(0), Duration::from_millis(5));
    }

    #[test]
    fn doubles_per_failure() {
        let policy = exponential(5, Duration::from_secs(1000));
        assert_eq!(policy.next(1), Duration::from_millis(10));
        assert_eq!(policy.next(2), Duration::from_millis(20));
        assert_eq!(policy.next(5), Duration::from_millis(160));
    }

    #[test]
    fn capped_at_max() {
        let policy = exponential(100, Duration::from_secs(1));
        assert_eq!(policy.next(10), Duration::from_secs(1));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn first_larger_than_max_is_clamped() {
        let policy = exponential(10_000, Duration::from_secs(5));
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn equal_jitter_stays_within_half_and_base() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(1000),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::Equal,
        };
        for failures in 0..50 {
            let delay = policy.next(failures);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn decorrelated_jitter_respects_floor() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Decorrelated,
            ..exponential(100, Duration::from_secs(30))
        };
        for _ in 0..100 {
            assert!(policy.next(8) >= Duration::from_millis(100));
        }
    }

    proptest! {
        #[test]
        fn delays_never_decrease_without_jitter(
            first_ms in 1u64..10_000,
            max_ms in 1u64..10_000_000,
            factor in 1.0f64..4.0,
            failures in 0u32..64,
        ) {
            let policy = BackoffPolicy {
                first: Duration::from_millis(first_ms),
                max: Duration::from_millis(max_ms),
                factor,
                jitter: JitterPolicy::None,
            };
            let cur = policy.next(failures);
            let next = policy.next(failures + 1);
            prop_assert!(cur <= next);
            prop_assert!(next <= policy.max);
        }
    }
}
