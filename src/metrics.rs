//! # Metrics sink consumed by controller workers.
//!
//! Workers report one sync call per handler invocation, regardless of outcome.
//! [`SyncCallCounter`] is an in-process counter keyed by controller name; plug
//! your own [`Metrics`] to forward to an exporter.

use std::sync::Arc;

use dashmap::DashMap;

/// Shared handle to a metrics sink.
pub type MetricsRef = Arc<dyn Metrics>;

/// Sink for controller metrics. Must tolerate concurrent calls from every worker.
pub trait Metrics: Send + Sync + 'static {
    /// Counts one handler invocation for `controller`.
    fn increment_sync_call_count(&self, controller: &str);
}

/// Concurrent per-controller sync call counter.
///
/// # Example
/// ```
/// use reconvisor::{Metrics, SyncCallCounter};
///
/// let counter = SyncCallCounter::new();
/// counter.increment_sync_call_count("issuers");
/// counter.increment_sync_call_count("issuers");
/// assert_eq!(counter.sync_call_count("issuers"), 2);
/// assert_eq!(counter.sync_call_count("orders"), 0);
/// ```
#[derive(Debug, Default)]
pub struct SyncCallCounter {
    calls: DashMap<String, u64>,
}

impl SyncCallCounter {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sync calls recorded for `controller`.
    pub fn sync_call_count(&self, controller: &str) -> u64 {
        self.calls.get(controller).map(|c| *c).unwrap_or(0)
    }
}

impl Metrics for SyncCallCounter {
    fn increment_sync_call_count(&self, controller: &str) {
        if let Some(mut count) = self.calls.get_mut(controller) {
            *count += 1;
            return;
        }
        *self.calls.entry(controller.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let counter = Arc::new(SyncCallCounter::new());
        let mut set = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            set.spawn(async move {
                for _ in 0..1000 {
                    counter.increment_sync_call_count("certificates");
                }
            });
        }
        while set.join_next().await.is_some() {}

        assert_eq!(counter.sync_call_count("certificates"), 8000);
    }
}
