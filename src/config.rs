//! # Controller runtime configuration.
//!
//! [`Config`] centralizes the knobs that are not part of a controller's identity.
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `Controller::builder(..).with_config(cfg)`
//! 2. **Queue defaults**: `RateLimitingQueue::from_config(&cfg)`
//!
//! ## Sentinel values
//! - `readiness_poll = 0s` → clamped to 1ms (never busy-loops)

use std::time::Duration;

use crate::policies::BackoffPolicy;

const MIN_READINESS_POLL: Duration = Duration::from_millis(1);

/// Runtime configuration shared by controllers.
///
/// ## Field semantics
/// - `readiness_poll`: how often readiness checks are re-evaluated while waiting to start
/// - `backoff`: per-key requeue backoff for queues built with [`RateLimitingQueue::from_config`](crate::RateLimitingQueue::from_config)
///
/// All fields are public; prefer the accessors that resolve sentinel values.
#[derive(Clone, Debug)]
pub struct Config {
    /// Interval between two evaluations of the readiness checks.
    pub readiness_poll: Duration,

    /// Default backoff for failed keys.
    pub backoff: BackoffPolicy,
}

impl Config {
    /// Returns the readiness poll interval, never below 1ms.
    #[inline]
    pub fn readiness_poll_clamped(&self) -> Duration {
        self.readiness_poll.max(MIN_READINESS_POLL)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `readiness_poll = 100ms`
    /// - `backoff = BackoffPolicy::default()` (5ms doubling up to 1000s)
    fn default() -> Self {
        Self {
            readiness_poll: Duration::from_millis(100),
            backoff: BackoffPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_poll_is_clamped() {
        let cfg = Config {
            readiness_poll: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.readiness_poll_clamped(), Duration::from_millis(1));
    }
}
