use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    handler::HandlerRef,
    metrics::{MetricsRef, SyncCallCounter},
    queue::WorkQueue,
    readiness::ReadinessRef,
    tasks::{PeriodicSpec, TaskRef},
};
use super::controller::Controller;

/// Builder for wiring a [`Controller`].
///
/// Registration order is preserved: bootstrap tasks run in the order they were added.
pub struct ControllerBuilder {
    name: Arc<str>,
    handler: HandlerRef,
    queue: Arc<dyn WorkQueue>,
    readiness: Vec<ReadinessRef>,
    bootstrap: Vec<TaskRef>,
    periodic: Vec<PeriodicSpec>,
    metrics: Option<MetricsRef>,
    cfg: Config,
}

impl ControllerBuilder {
    /// Creates a new builder; see [`Controller::builder`].
    pub fn new(name: Arc<str>, handler: HandlerRef, queue: Arc<dyn WorkQueue>) -> Self {
        Self {
            name,
            handler,
            queue,
            readiness: Vec::new(),
            bootstrap: Vec::new(),
            periodic: Vec::new(),
            metrics: None,
            cfg: Config::default(),
        }
    }

    /// Adds a check that must pass before workers start.
    pub fn with_readiness(mut self, check: ReadinessRef) -> Self {
        self.readiness.push(check);
        self
    }

    /// Adds several readiness checks at once.
    pub fn with_readiness_checks(mut self, checks: impl IntoIterator<Item = ReadinessRef>) -> Self {
        self.readiness.extend(checks);
        self
    }

    /// Adds a task invoked once, right after the workers are launched.
    pub fn with_bootstrap(mut self, task: TaskRef) -> Self {
        self.bootstrap.push(task);
        self
    }

    /// Adds a task fired every `interval` while the controller runs.
    pub fn with_periodic(self, task: TaskRef, interval: Duration) -> Self {
        self.with_periodic_spec(PeriodicSpec::new(task, interval))
    }

    /// Adds a prepared periodic specification.
    pub fn with_periodic_spec(mut self, spec: PeriodicSpec) -> Self {
        self.periodic.push(spec);
        self
    }

    /// Sets the metrics sink (defaults to a private [`SyncCallCounter`]).
    pub fn with_metrics(mut self, metrics: MetricsRef) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the runtime configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Builds the controller.
    pub fn build(self) -> Arc<Controller> {
        let metrics = self
            .metrics
            .unwrap_or_else(|| Arc::new(SyncCallCounter::new()));

        Arc::new(Controller {
            name: self.name,
            handler: self.handler,
            queue: self.queue,
            readiness: self.readiness,
            bootstrap: self.bootstrap,
            periodic: self.periodic,
            metrics,
            cfg: self.cfg,
        })
    }
}
