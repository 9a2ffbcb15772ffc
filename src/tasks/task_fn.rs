//! # Closure-backed side tasks.
//!
//! [`TaskFn`] turns `Fn(CancellationToken) -> Fut` into a [`Task`]. The closure is
//! called once per invocation: once for a bootstrap task, once per tick for a
//! periodic one, possibly while the previous tick is still running. State that
//! must survive between invocations is captured as `Arc<...>` and cloned into
//! each future.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use tokio_util::sync::CancellationToken;
//! use reconvisor::{TaskError, TaskFn, TaskRef};
//!
//! let resyncs = Arc::new(AtomicU64::new(0));
//! let counter = Arc::clone(&resyncs);
//! let resync: TaskRef = TaskFn::arc("resync-secrets", move |ctx: CancellationToken| {
//!     let counter = Arc::clone(&counter);
//!     async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         counter.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//! });
//!
//! assert_eq!(resync.name(), "resync-secrets");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Named closure run as a bootstrap or periodic task.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Wraps `f` under `name`; the name shows up in task logs.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Same as [`TaskFn::new`], ready for `with_bootstrap` / `with_periodic`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        Box::pin((self.f)(ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn closure_runs_once_per_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let task = TaskFn::new("tick", move |_ctx: CancellationToken| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), TaskError>(()) }
        });

        let first = task.spawn(CancellationToken::new());
        let second = task.spawn(CancellationToken::new());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        first.await.unwrap();
        second.await.unwrap();
    }
}
