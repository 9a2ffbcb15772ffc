//! # Worker: drains the controller's queue one key at a time.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► queue.get()            (blocks; None = shut down and drained → exit)
//!   ├─► metrics.increment_sync_call_count(controller)
//!   ├─► handler.sync(ctx, key) (panics are caught and count as a failure)
//!   │       │
//!   │       ├─ Ok  ──► queue.forget(key) ─► queue.done(key)
//!   │       └─ Err ──► queue.done(key) ──► queue.add_with_backoff(key)
//!   │                  ├─ Conflict → info
//!   │                  └─ Fail     → error
//! }
//! ```
//!
//! ## Rules
//! - `done` is called exactly once for every key returned by `get`.
//! - Handler failures never end the loop; only queue shutdown does.
//! - Conflicts and other failures are retried identically; only the log level differs.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::error::HandlerError;
use crate::handler::HandlerRef;
use crate::metrics::MetricsRef;
use crate::queue::{Key, WorkQueue};

/// One worker loop of a controller.
pub(crate) struct Worker {
    /// Controller name (log and metrics attribution).
    pub controller: Arc<str>,
    /// Reconciliation handler.
    pub handler: HandlerRef,
    /// Queue shared by every worker of the controller.
    pub queue: Arc<dyn WorkQueue>,
    /// Metrics sink shared by every worker.
    pub metrics: MetricsRef,
}

impl Worker {
    /// Runs until the queue reports shutdown.
    pub async fn run(self, ctx: CancellationToken) {
        debug!(controller = %self.controller, "starting worker");
        while let Some(key) = self.queue.get().await {
            self.process(&ctx, key).await;
        }
        debug!(controller = %self.controller, "exiting worker loop");
    }

    async fn process(&self, ctx: &CancellationToken, key: Key) {
        let controller = &*self.controller;
        trace!(controller, %key, "syncing item");

        self.metrics.increment_sync_call_count(controller);

        let outcome = AssertUnwindSafe(self.handler.sync(ctx.clone(), &key))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(HandlerError::fail(format!(
                    "handler panicked: {}",
                    panic_message(&*panic)
                )))
            });

        match outcome {
            Ok(()) => {
                self.queue.forget(&key);
                self.queue.done(&key);
                debug!(controller, %key, "finished processing work item");
            }
            Err(err) => {
                self.queue.done(&key);
                self.queue.add_with_backoff(key.clone());

                let requeues = self.queue.num_requeues(&key);
                if err.is_conflict() {
                    info!(controller, %key, requeues, error = %err, "re-queuing item due to optimistic locking on resource");
                } else {
                    error!(controller, %key, requeues, error = %err, "re-queuing item due to error processing");
                }
            }
        }
    }
}

/// Text of a caught panic payload.
pub(super) fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::handler::HandlerFn;
    use crate::metrics::SyncCallCounter;
    use crate::policies::{BackoffPolicy, JitterPolicy};
    use crate::queue::RateLimitingQueue;

    fn queue() -> Arc<RateLimitingQueue> {
        RateLimitingQueue::with_backoff(BackoffPolicy {
            first: Duration::from_secs(60),
            max: Duration::from_secs(600),
            factor: 2.0,
            jitter: JitterPolicy::None,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_handler_is_requeued_and_worker_survives() {
        let queue = queue();
        let metrics = Arc::new(SyncCallCounter::new());
        let worker = Worker {
            controller: Arc::from("panics"),
            handler: HandlerFn::arc(|_ctx: CancellationToken, key: Key| async move {
                if key.as_str() == "bad" {
                    panic!("boom");
                }
                Ok::<(), HandlerError>(())
            }),
            queue: queue.clone(),
            metrics: metrics.clone(),
        };

        queue.add(Key::from("bad"));
        queue.add(Key::from("good"));
        let handle = tokio::spawn(worker.run(CancellationToken::new()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(metrics.sync_call_count("panics"), 2);
        assert_eq!(queue.num_requeues(&Key::from("bad")), 1);
        assert_eq!(queue.num_requeues(&Key::from("good")), 0);

        queue.shut_down();
        handle.await.unwrap();
    }

    #[test]
    fn panic_payloads_are_described() {
        let s: &(dyn std::any::Any + Send) = &"static";
        assert_eq!(panic_message(s), "static");
        let owned: &(dyn std::any::Any + Send) = &String::from("owned");
        assert_eq!(panic_message(owned), "owned");
        let other: &(dyn std::any::Any + Send) = &42u8;
        assert_eq!(panic_message(other), "non-string panic payload");
    }
}
