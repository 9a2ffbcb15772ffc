//! # Controller: readiness gating, worker pool, side tasks, graceful shutdown.
//!
//! The [`Controller`] owns everything a single reconciliation loop needs: a name,
//! a handler, a work queue, readiness checks, bootstrap tasks and periodic tasks.
//! [`Controller::run`] is the only place that spawns and joins their executions.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   workers: usize, stop: CancellationToken
//!
//! 1. Readiness:
//!   wait_for_ready(checks, stop, cfg.readiness_poll)
//!     ├─ all ready   → continue
//!     └─ stop fired  → Err(RuntimeError::NotReady)   (no worker started)
//!
//! 2. Workers:
//!   Worker[0]  Worker[1]  ...  Worker[N-1]      (JoinSet, each loops on queue.get())
//!
//! 3. Bootstrap:
//!   for task in bootstrap { task.spawn(ctx).await }  (runs alongside the workers)
//!
//! 4. Periodic:
//!   run_periodic(spec[i], ctx, stop)            (JoinSet, one runner per spec)
//!
//! 5. stop.cancelled().await
//!
//! Shutdown path:
//!   queue.shut_down()          → queued keys drain, then get() returns None
//!   join all workers           → in-flight handler calls complete first
//!   ctx.cancel()               → bootstrap/periodic tasks and handlers observe it
//!   join periodic runners
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use reconvisor::{Controller, HandlerError, HandlerFn, Key, RateLimitingQueue, WorkQueue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = RateLimitingQueue::with_backoff(Default::default());
//!     let handler = HandlerFn::arc(|_ctx: CancellationToken, key: Key| async move {
//!         println!("reconciling {key}");
//!         Ok::<(), HandlerError>(())
//!     });
//!
//!     let controller = Controller::builder("issuers", handler, queue.clone()).build();
//!     queue.add(Key::namespaced("default", "letsencrypt"));
//!
//!     let stop = CancellationToken::new();
//!     let trigger = stop.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         trigger.cancel();
//!     });
//!
//!     controller.run(2, stop).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::{
    builder::ControllerBuilder,
    periodic::{invoke, run_periodic},
    readiness::wait_for_ready,
    worker::Worker,
};
use crate::error::RuntimeError;
use crate::handler::HandlerRef;
use crate::metrics::MetricsRef;
use crate::queue::WorkQueue;
use crate::readiness::ReadinessRef;
use crate::tasks::{PeriodicSpec, TaskRef};

/// A named reconciliation loop.
///
/// Built once with [`Controller::builder`], immutable afterwards.
pub struct Controller {
    pub(crate) name: Arc<str>,
    pub(crate) handler: HandlerRef,
    pub(crate) queue: Arc<dyn WorkQueue>,
    pub(crate) readiness: Vec<ReadinessRef>,
    pub(crate) bootstrap: Vec<TaskRef>,
    pub(crate) periodic: Vec<PeriodicSpec>,
    pub(crate) metrics: MetricsRef,
    pub(crate) cfg: Config,
}

impl Controller {
    /// Starts wiring a controller named `name` that reconciles keys from `queue` with `handler`.
    ///
    /// `name` is used verbatim for log and metrics attribution.
    pub fn builder(
        name: impl Into<Arc<str>>,
        handler: HandlerRef,
        queue: Arc<dyn WorkQueue>,
    ) -> ControllerBuilder {
        ControllerBuilder::new(name.into(), handler, queue)
    }

    /// Returns the controller name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the controller's work queue (for producers).
    pub fn queue(&self) -> &Arc<dyn WorkQueue> {
        &self.queue
    }

    /// Returns the runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runs the control loop with `workers` concurrent workers until `stop` fires.
    ///
    /// Returns [`RuntimeError::NotReady`] if `stop` fires before every readiness
    /// check passed; in that case no worker is ever started. Otherwise returns
    /// `Ok(())` once the queue is shut down and every worker has exited.
    pub async fn run(&self, workers: usize, stop: CancellationToken) -> Result<(), RuntimeError> {
        debug!(controller = %self.name, workers, "starting control loop");

        let poll = self.cfg.readiness_poll_clamped();
        if !wait_for_ready(&self.name, &self.readiness, &stop, poll).await {
            error!(controller = %self.name, "error waiting for readiness checks to pass");
            return Err(RuntimeError::NotReady {
                controller: self.name.to_string(),
            });
        }

        let ctx = CancellationToken::new();
        let _cancel_ctx = ctx.clone().drop_guard();

        let mut worker_set = JoinSet::new();
        self.spawn_workers(&mut worker_set, workers, &ctx);

        self.run_bootstrap(&ctx).await;

        let mut periodic_set = JoinSet::new();
        self.spawn_periodic(&mut periodic_set, &ctx, &stop);

        stop.cancelled().await;
        self.drive_shutdown(&mut worker_set, &mut periodic_set, &ctx)
            .await;
        Ok(())
    }

    /// Spawns `n` worker loops into the given join set.
    fn spawn_workers(&self, set: &mut JoinSet<()>, n: usize, ctx: &CancellationToken) {
        if n == 0 {
            warn!(controller = %self.name, "no workers requested; queue will not be drained");
        }
        for _ in 0..n {
            let worker = Worker {
                controller: Arc::clone(&self.name),
                handler: Arc::clone(&self.handler),
                queue: Arc::clone(&self.queue),
                metrics: Arc::clone(&self.metrics),
            };
            set.spawn(worker.run(ctx.clone()));
        }
    }

    /// Invokes every bootstrap task once, in registration order.
    ///
    /// Failures and panics are logged by `invoke`; workers keep running either way.
    async fn run_bootstrap(&self, ctx: &CancellationToken) {
        for task in &self.bootstrap {
            invoke(Arc::clone(&self.name), Arc::clone(task), ctx.clone()).await;
        }
    }

    /// Spawns one runner per periodic spec.
    fn spawn_periodic(
        &self,
        set: &mut JoinSet<()>,
        ctx: &CancellationToken,
        stop: &CancellationToken,
    ) {
        for spec in &self.periodic {
            set.spawn(run_periodic(
                Arc::clone(&self.name),
                spec.clone(),
                ctx.clone(),
                stop.clone(),
            ));
        }
    }

    /// Shuts the queue down, joins workers, then releases side tasks.
    async fn drive_shutdown(
        &self,
        workers: &mut JoinSet<()>,
        periodic: &mut JoinSet<()>,
        ctx: &CancellationToken,
    ) {
        info!(controller = %self.name, "shutting down queue as stop was requested");
        self.queue.shut_down();

        debug!(controller = %self.name, "waiting for workers to exit...");
        while let Some(res) = workers.join_next().await {
            if let Err(err) = res {
                error!(controller = %self.name, error = %err, "worker terminated abnormally");
            }
        }
        debug!(controller = %self.name, "workers exited");

        ctx.cancel();
        while periodic.join_next().await.is_some() {}
    }
}
