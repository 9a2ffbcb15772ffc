//! # reconvisor
//!
//! **Reconvisor** is a reconciliation-loop engine for Rust.
//!
//! It runs many independent controllers uniformly: each one pulls keys from a
//! work queue, hands them to a caller-supplied [`Handler`], and requeues failed
//! keys with per-key exponential backoff. What a handler reconciles is up to the
//! caller; the engine owns readiness gating, the worker pool, side tasks and
//! graceful shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   watchers / producers ──── add(key) ───────────────┐
//!                                                     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  WorkQueue (dedup, in-flight tracking, per-key backoff)           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼ get()            ▼ get()            ▼ get()
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 1   │   │   Worker 2   │   │   Worker N   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ handler.sync(ctx, key)              │
//!      ├─ Ok  ─► forget(key), done(key)      │
//!      └─ Err ─► done(key), add_with_backoff(key)
//!
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Controller::run(workers, stop)                                   │
//! │  - waits for ReadinessChecks (or stop → RuntimeError::NotReady)   │
//! │  - launches workers, runs bootstrap tasks once                    │
//! │  - fires PeriodicSpecs on independent timers                      │
//! │  - on stop: queue.shut_down(), join workers, cancel ctx           │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Guarantees
//! - A key is processed by at most one worker at a time (queue in-flight tracking).
//! - `done` follows every successful `get`, on every path.
//! - Handler errors never escape a worker; only readiness failure escapes `run`.
//! - `run` returns only after every worker has exited.
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                               |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------------|
//! | **Controller**    | Lifecycle of one reconciliation loop.                         | [`Controller`], [`ControllerBuilder`]            |
//! | **Handlers**      | Controller-specific reconciliation.                           | [`Handler`], [`HandlerFn`], [`HandlerError`]     |
//! | **Queues**        | Deduplicating queue with in-flight tracking and backoff.      | [`WorkQueue`], [`RateLimitingQueue`], [`Key`]    |
//! | **Policies**      | Per-key requeue delays.                                       | [`BackoffPolicy`], [`JitterPolicy`], [`RateLimiter`] |
//! | **Readiness**     | Preconditions gating startup.                                 | [`ReadinessCheck`], [`ReadyFlag`], [`CheckFn`]   |
//! | **Side tasks**    | Bootstrap and periodic work outside the queue.                | [`Task`], [`TaskFn`], [`PeriodicSpec`]           |
//! | **Metrics**       | Sync call accounting.                                         | [`Metrics`], [`SyncCallCounter`]                 |
//! | **Configuration** | Readiness poll and default backoff.                           | [`Config`]                                       |
//!
//! Logging goes through [`tracing`] with `controller` and `key` fields; install
//! any subscriber in the host process.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use reconvisor::{
//!     Controller, HandlerError, HandlerFn, Key, RateLimitingQueue, ReadyFlag, TaskError, TaskFn,
//!     WorkQueue,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = RateLimitingQueue::with_backoff(Default::default());
//!     let synced = ReadyFlag::arc("certificates-cache");
//!
//!     let handler = HandlerFn::arc(|_ctx: CancellationToken, key: Key| async move {
//!         match key.split() {
//!             (Some(_namespace), _name) => Ok(()),
//!             (None, _) => Err(HandlerError::fail("certificates are namespaced")),
//!         }
//!     });
//!
//!     let resync = TaskFn::arc("resync", |_ctx: CancellationToken| async move {
//!         Ok::<(), TaskError>(())
//!     });
//!
//!     let controller = Controller::builder("certificates", handler, queue.clone())
//!         .with_readiness(synced.clone())
//!         .with_periodic(resync, Duration::from_secs(30))
//!         .build();
//!
//!     synced.mark_ready();
//!     queue.add(Key::namespaced("default", "web-tls"));
//!
//!     let stop = CancellationToken::new();
//!     let trigger = stop.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(50)).await;
//!         trigger.cancel();
//!     });
//!
//!     controller.run(4, stop).await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod handler;
mod metrics;
mod policies;
mod queue;
mod readiness;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{Controller, ControllerBuilder};
pub use error::{HandlerError, RuntimeError, TaskError};
pub use handler::{Handler, HandlerFn, HandlerRef};
pub use metrics::{Metrics, MetricsRef, SyncCallCounter};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use queue::{ExponentialFailureRateLimiter, Key, RateLimiter, RateLimitingQueue, WorkQueue};
pub use readiness::{CheckFn, ReadinessCheck, ReadinessRef, ReadyFlag};
pub use tasks::{BoxTaskFuture, PeriodicSpec, Task, TaskFn, TaskRef};
