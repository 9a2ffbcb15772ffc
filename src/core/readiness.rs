//! Blocking wait on readiness checks, cancellable by the stop signal.

use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::readiness::ReadinessRef;

/// Waits until every check reports ready or `stop` fires.
///
/// Checks are evaluated immediately, then every `poll`. Returns `true` once all
/// checks pass (an empty set passes at once), `false` if `stop` fired first.
pub(crate) async fn wait_for_ready(
    controller: &str,
    checks: &[ReadinessRef],
    stop: &CancellationToken,
    poll: Duration,
) -> bool {
    loop {
        let pending: Vec<&str> = checks
            .iter()
            .filter(|c| !c.is_ready())
            .map(|c| c.name())
            .collect();
        if pending.is_empty() {
            return true;
        }
        tracing::trace!(controller, ?pending, "waiting for readiness checks");

        select! {
            biased;
            _ = stop.cancelled() => return false,
            _ = time::sleep(poll) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::readiness::ReadyFlag;

    const POLL: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn no_checks_are_ready_immediately() {
        let stop = CancellationToken::new();
        assert!(wait_for_ready("c", &[], &stop, POLL).await);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_until_flag_flips() {
        let flag = ReadyFlag::arc("informer");
        let checks: Vec<ReadinessRef> = vec![flag.clone()];
        let stop = CancellationToken::new();

        let setter = {
            let flag = Arc::clone(&flag);
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(350)).await;
                flag.mark_ready();
            })
        };

        let started = time::Instant::now();
        assert!(wait_for_ready("c", &checks, &stop, POLL).await);
        assert!(started.elapsed() >= Duration::from_millis(350));
        setter.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_aborts_wait() {
        let checks: Vec<ReadinessRef> = vec![ReadyFlag::arc("never")];
        let stop = CancellationToken::new();

        let canceller = stop.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        assert!(!wait_for_ready("c", &checks, &stop, POLL).await);
    }
}
