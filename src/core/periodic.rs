//! # Periodic task runner.
//!
//! Fires one [`PeriodicSpec`] on its own timer, independent of the work queue.
//!
//! ```text
//! start ──(interval)──► tick ─► spawn invocation #1
//!       ──(interval)──► tick ─► spawn invocation #2   (may overlap #1)
//!       ...
//! stop  ──► stop ticking ─► await in-flight invocations
//! ```
//!
//! ## Rules
//! - The first tick fires after one full interval, never at start.
//! - Invocations are spawned, so a slow one never delays the next tick.
//! - Ticks missed while the runtime was stalled are delayed, not replayed in a burst.
//! - Task errors are logged and never escalated.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{
    select,
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::worker::panic_message;
use crate::error::TaskError;
use crate::tasks::{PeriodicSpec, TaskRef};

/// Runs `spec` every interval until `stop` fires.
///
/// Invocations receive `ctx`; in-flight ones are awaited before returning.
pub(crate) async fn run_periodic(
    controller: Arc<str>,
    spec: PeriodicSpec,
    ctx: CancellationToken,
    stop: CancellationToken,
) {
    let interval = spec.interval();
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut inflight = JoinSet::new();
    loop {
        select! {
            biased;
            _ = stop.cancelled() => break,
            res = inflight.join_next(), if !inflight.is_empty() => {
                if let Some(Err(err)) = res {
                    warn!(controller = %controller, task = spec.name(), error = %err, "periodic invocation did not complete");
                }
            }
            _ = ticker.tick() => {
                inflight.spawn(invoke(
                    Arc::clone(&controller),
                    Arc::clone(spec.task()),
                    ctx.clone(),
                ));
            }
        }
    }

    debug!(controller = %controller, task = spec.name(), inflight = inflight.len(), "periodic task stopped");
    while let Some(res) = inflight.join_next().await {
        if let Err(err) = res {
            warn!(controller = %controller, task = spec.name(), error = %err, "periodic invocation did not complete");
        }
    }
}

/// Invokes a bootstrap or periodic task once and logs its outcome.
///
/// A panicking task is logged like a failure; the panic never reaches the caller.
pub(crate) async fn invoke(controller: Arc<str>, task: TaskRef, ctx: CancellationToken) {
    let outcome = AssertUnwindSafe(task.spawn(ctx)).catch_unwind().await;
    match outcome {
        Ok(Ok(())) => trace!(controller = %controller, task = task.name(), "task finished"),
        Ok(Err(TaskError::Canceled)) => {
            debug!(controller = %controller, task = task.name(), "task cancelled")
        }
        Ok(Err(err)) => warn!(
            controller = %controller,
            task = task.name(),
            label = err.as_label(),
            error = %err,
            "task failed"
        ),
        Err(panic) => warn!(
            controller = %controller,
            task = task.name(),
            panic = panic_message(&*panic),
            "task panicked"
        ),
    }
}
