//! # Jitter for requeue delays.
//!
//! Many keys failing at the same moment (an unavailable upstream, a burst of
//! conflicts) would otherwise come back at the same moment too. [`JitterPolicy`]
//! spreads them out.
//!
//! - [`JitterPolicy::None`] exact delay
//! - [`JitterPolicy::Full`] uniform in `[0, delay]`
//! - [`JitterPolicy::Equal`] `delay/2 + uniform[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`] uniform in `[base, prev × 3]`, capped at max

use std::time::Duration;

use rand::Rng;

/// Randomization strategy applied on top of a backoff delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Half the delay plus uniform in `[0, delay/2]`.
    Equal,
    /// Uniform in `[base, prev × 3]`, capped at max.
    ///
    /// Needs extra context, see [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `delay`.
    ///
    /// `Decorrelated` returns `delay` unchanged here.
    pub fn apply(&self, delay: Duration) -> Duration {
        let ms = millis(delay);
        if ms == 0 {
            return delay;
        }
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => Duration::from_millis(rand::rng().random_range(0..=ms)),
            JitterPolicy::Equal => {
                let half = ms / 2;
                let extra = if half == 0 {
                    0
                } else {
                    rand::rng().random_range(0..=half)
                };
                Duration::from_millis(half + extra)
            }
        }
    }

    /// Applies decorrelated jitter given the floor, the undecorated delay and the cap.
    ///
    /// Falls back to [`apply`](Self::apply) on `prev` for any other variant.
    pub fn apply_decorrelated(&self, base: Duration, prev: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(prev);
        }

        let lo = millis(base);
        let hi = millis(prev).saturating_mul(3).min(millis(max)).max(lo);
        if lo >= hi {
            return base;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

fn millis(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}
