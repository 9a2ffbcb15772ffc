//! Runtime core: the controller execution engine.
//!
//! The only public API from this module is [`Controller`] and its
//! [`ControllerBuilder`].
//!
//! Internal modules:
//! - [`controller`]: lifecycle coordination (readiness, launch, bootstrap, periodic, shutdown);
//! - [`builder`]: wiring of a controller;
//! - [`worker`]: one queue-draining loop with outcome classification;
//! - [`periodic`]: timer-driven side tasks;
//! - [`readiness`]: cancellable wait on readiness checks.

mod builder;
mod controller;
mod periodic;
mod readiness;
mod worker;

pub use builder::ControllerBuilder;
pub use controller::Controller;
