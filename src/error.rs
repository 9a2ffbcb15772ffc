//! Error types used by the reconvisor runtime, handlers and tasks.
//!
//! - [`RuntimeError`] errors raised by the controller runtime itself.
//! - [`HandlerError`] errors returned by a reconciliation [`Handler`](crate::Handler).
//! - [`TaskError`] errors returned by bootstrap and periodic tasks.
//!
//! All types provide `as_label` (stable snake_case label for logs/metrics) and
//! `as_message` helpers.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by the controller runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The stop signal fired before every readiness check passed; no worker was started.
    #[error("controller {controller:?} failed to become ready before stop was requested")]
    NotReady {
        /// Name of the controller that gave up waiting.
        controller: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use reconvisor::RuntimeError;
    ///
    /// let err = RuntimeError::NotReady { controller: "certificates".into() };
    /// assert_eq!(err.as_label(), "runtime_not_ready");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NotReady { .. } => "runtime_not_ready",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::NotReady { controller } => {
                format!("readiness checks did not pass; controller={controller}")
            }
        }
    }
}

/// # Errors returned by a reconciliation handler.
///
/// Every variant is retried the same way (key marked done, then re-added with
/// backoff). The variant only decides how loudly the failure is logged.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Optimistic concurrency violation: the handler acted on a stale version of the resource.
    ///
    /// Expected under contention; logged at info.
    #[error("conflict: {reason}")]
    Conflict {
        /// The underlying error message.
        reason: String,
    },

    /// Any other failure; logged at error.
    #[error("sync failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },
}

impl HandlerError {
    /// Builds a [`HandlerError::Conflict`] from anything displayable.
    pub fn conflict(reason: impl Display) -> Self {
        HandlerError::Conflict {
            reason: reason.to_string(),
        }
    }

    /// Builds a [`HandlerError::Fail`] from anything displayable.
    pub fn fail(reason: impl Display) -> Self {
        HandlerError::Fail {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use reconvisor::HandlerError;
    ///
    /// assert_eq!(HandlerError::conflict("stale").as_label(), "handler_conflict");
    /// assert_eq!(HandlerError::fail("boom").as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Conflict { .. } => "handler_conflict",
            HandlerError::Fail { .. } => "handler_failed",
        }
    }

    /// Returns the underlying reason.
    pub fn as_message(&self) -> &str {
        match self {
            HandlerError::Conflict { reason } | HandlerError::Fail { reason } => reason,
        }
    }

    /// True for optimistic concurrency conflicts.
    pub fn is_conflict(&self) -> bool {
        matches!(self, HandlerError::Conflict { .. })
    }
}

/// # Errors returned by bootstrap and periodic tasks.
///
/// Task errors are logged and never escalated to [`Controller::run`](crate::Controller::run).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task failed.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// The task observed cancellation of its context and stopped early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Builds a [`TaskError::Fail`] from anything displayable.
    pub fn fail(reason: impl Display) -> Self {
        TaskError::Fail {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { reason } => format!("error: {reason}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_classified_by_kind_not_message() {
        let conflict = HandlerError::conflict("boom");
        let fail = HandlerError::fail("the object has been modified; please apply your changes");
        assert!(conflict.is_conflict());
        assert!(!fail.is_conflict());
    }

    #[test]
    fn display_includes_reason() {
        assert_eq!(HandlerError::fail("boom").to_string(), "sync failed: boom");
        assert_eq!(TaskError::fail("x").as_message(), "error: x");
    }
}
