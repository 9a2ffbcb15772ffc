//! # Task abstraction for bootstrap and periodic work.
//!
//! A [`Task`] is a named unit of side work attached to a controller, outside the
//! work queue: a one-time bootstrap step or a periodic resync.
//!
//! Every call to [`Task::spawn`] produces a fresh `'static` future, so the same
//! task can be invoked many times, and concurrently, by the periodic runner.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Named, cancelable unit of side work.
///
/// `ctx` is the controller's run context: it is cancelled once the controller has
/// shut down its workers. Long-running tasks should watch it and return early.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use reconvisor::{BoxTaskFuture, Task, TaskError};
///
/// struct Resync;
///
/// impl Task for Resync {
///     fn name(&self) -> &str { "resync" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates a new future for one invocation.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
