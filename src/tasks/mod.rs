//! # Side tasks attached to a controller.
//!
//! - [`Task`] - trait for cancelable bootstrap/periodic work
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`PeriodicSpec`] - task plus firing interval

mod spec;
mod task;
mod task_fn;

pub use spec::PeriodicSpec;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
