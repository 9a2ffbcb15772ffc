//! # Readiness checks gating controller startup.
//!
//! A controller does not start its workers until every registered
//! [`ReadinessCheck`] reports ready, typically "the initial list of resource X
//! has been loaded into the local cache".
//!
//! - [`ReadyFlag`] shareable flag flipped by whoever performs the initial load
//! - [`CheckFn`] closure-backed check
//!
//! The blocking wait itself lives in the controller runtime and polls every
//! [`Config::readiness_poll`](crate::Config::readiness_poll).

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared handle to a readiness check.
pub type ReadinessRef = Arc<dyn ReadinessCheck>;

/// An eventually-true precondition.
pub trait ReadinessCheck: Send + Sync + 'static {
    /// Human-readable name (for logs).
    fn name(&self) -> &str;

    /// True once the precondition holds. Must be cheap and non-blocking.
    fn is_ready(&self) -> bool;
}

/// A settable readiness flag.
///
/// # Example
/// ```
/// use reconvisor::{ReadinessCheck, ReadyFlag};
///
/// let synced = ReadyFlag::arc("certificates-informer");
/// assert!(!synced.is_ready());
/// synced.mark_ready();
/// assert!(synced.is_ready());
/// ```
#[derive(Debug)]
pub struct ReadyFlag {
    name: Cow<'static, str>,
    ready: AtomicBool,
}

impl ReadyFlag {
    /// Creates a flag that is not ready yet.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ready: AtomicBool::new(false),
        }
    }

    /// Creates a flag and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Marks the flag as ready. Idempotent.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }
}

impl ReadinessCheck for ReadyFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

/// Closure-backed readiness check.
pub struct CheckFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CheckFn<F>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Wraps a closure and returns a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> ReadinessCheck for CheckFn<F>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        (self.f)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn check_fn_is_evaluated_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let check = CheckFn::new("counter", move || seen.fetch_add(1, Ordering::SeqCst) >= 2);

        assert!(!check.is_ready());
        assert!(!check.is_ready());
        assert!(check.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
