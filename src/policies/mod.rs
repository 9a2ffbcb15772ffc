//! Requeue delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how the delay grows with consecutive failures of a key (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy so failing keys do not come back in lockstep
//!
//! ## Quick wiring
//! ```text
//! Config { backoff: BackoffPolicy, .. }
//!      └─► ExponentialFailureRateLimiter uses:
//!           - backoff.next(failures) to compute the requeue delay
//!           - one failure counter per key, reset by forget()
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
