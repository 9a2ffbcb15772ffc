//! Work queue: keys, the queue contract, and the default in-memory queue.
//!
//! ## Contents
//! - [`Key`] typed reconciliation key
//! - [`WorkQueue`] contract consumed by controller workers
//! - [`RateLimiter`], [`ExponentialFailureRateLimiter`] per-key requeue delays
//! - [`RateLimitingQueue`] default deduplicating queue with in-flight tracking

mod key;
mod rate_limiter;
mod rate_limiting;
mod work_queue;

pub use key::Key;
pub use rate_limiter::{ExponentialFailureRateLimiter, RateLimiter};
pub use rate_limiting::RateLimitingQueue;
pub use work_queue::WorkQueue;
