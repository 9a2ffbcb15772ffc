//! # Reconciliation handler.
//!
//! The [`Handler`] is the only controller-specific piece of the engine: it is
//! given a key and brings whatever the key names into its desired state.
//!
//! ## Contract
//! - Called concurrently for **distinct** keys; never concurrently for the same key.
//! - `Ok(())` forgets the key's failure history.
//! - `Err(_)` requeues the key with backoff. Return [`HandlerError::Conflict`]
//!   for optimistic concurrency violations so they are logged quietly.
//! - There is no per-call timeout; a handler that never returns stalls its worker.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::HandlerError;
use crate::queue::Key;

/// Shared handle to a handler.
pub type HandlerRef = Arc<dyn Handler>;

/// Reconciles one key.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use reconvisor::{Handler, HandlerError, Key};
///
/// struct Issuers;
///
/// #[async_trait]
/// impl Handler for Issuers {
///     async fn sync(&self, _ctx: CancellationToken, key: &Key) -> Result<(), HandlerError> {
///         let (_namespace, name) = key.split();
///         if name.is_empty() {
///             return Err(HandlerError::fail("empty name"));
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Reconciles `key`.
    ///
    /// `ctx` is cancelled only after every worker exited, so an in-flight call
    /// always runs to completion during shutdown.
    async fn sync(&self, ctx: CancellationToken, key: &Key) -> Result<(), HandlerError>;
}

/// Function-backed handler.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use reconvisor::{HandlerError, HandlerFn, HandlerRef, Key};
///
/// let handler: HandlerRef = HandlerFn::arc(|_ctx: CancellationToken, key: Key| async move {
///     println!("syncing {key}");
///     Ok::<(), HandlerError>(())
/// });
/// # let _ = handler;
/// ```
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wraps a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(CancellationToken, Key) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn sync(&self, ctx: CancellationToken, key: &Key) -> Result<(), HandlerError> {
        (self.f)(ctx, key.clone()).await
    }
}
