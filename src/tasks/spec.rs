//! # Periodic task specification.
//!
//! [`PeriodicSpec`] pairs a [`TaskRef`] with the interval it is fired at.
//! Specs are registered on the controller builder and started by
//! [`Controller::run`](crate::Controller::run) after the workers.
//!
//! ## Rules
//! - First invocation happens one full `interval` after start, never immediately.
//! - Each tick spawns its invocation independently: invocations may overlap.
//! - A zero interval is clamped to 1ms.

use std::time::Duration;

use crate::tasks::task::TaskRef;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A task fired every `interval` while the controller runs.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use reconvisor::{PeriodicSpec, TaskError, TaskFn, TaskRef};
///
/// let resync: TaskRef = TaskFn::arc("resync", |_ctx: CancellationToken| async move {
///     Ok::<(), TaskError>(())
/// });
///
/// let spec = PeriodicSpec::new(resync, Duration::from_secs(30));
/// assert_eq!(spec.name(), "resync");
/// assert_eq!(spec.interval(), Duration::from_secs(30));
/// ```
#[derive(Clone)]
pub struct PeriodicSpec {
    task: TaskRef,
    interval: Duration,
}

impl PeriodicSpec {
    /// Creates a new periodic specification.
    pub fn new(task: TaskRef, interval: Duration) -> Self {
        Self {
            task,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Returns reference to the task.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Convenience: returns the task name.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Returns the firing interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
