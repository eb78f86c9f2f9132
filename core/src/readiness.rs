//! Readiness waits: poll a condition until it holds or a deadline passes

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::health::Probe;
use crate::{CheckError, Result};

/// Poll `check` until it reports ready, returns an error, or `timeout` elapses.
///
/// `check` is always evaluated at least once, so a target that is already
/// ready returns immediately. Errors from `check` abort the wait unchanged;
/// "not ready yet" must be reported as `Ok(false)`. A timeout too large to
/// represent as a deadline means waiting without one.
///
/// Returns the time spent waiting.
pub async fn poll_until<F, Fut>(
    target: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<Duration>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let deadline = start.checked_add(timeout);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if check().await? {
            let waited = start.elapsed();
            debug!("{} ready after {} attempt(s), {:?}", target, attempts, waited);
            return Ok(waited);
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    warn!(
                        "{} still not ready after {} attempt(s) in {:?}",
                        target, attempts, timeout
                    );
                    return Err(CheckError::ReadinessTimeout {
                        target: target.to_string(),
                        waited: timeout,
                    });
                }
                interval.min(deadline - now)
            }
            None => interval,
        };
        sleep(pause).await;
    }
}

/// Poll a health probe until it passes.
///
/// Any probe error counts as "not ready yet".
pub async fn wait_for_probe<P>(
    target: &str,
    probe: &P,
    timeout: Duration,
    interval: Duration,
) -> Result<Duration>
where
    P: Probe + Sync + ?Sized,
{
    poll_until(target, timeout, interval, || async move {
        match probe.check().await {
            Ok(()) => Ok(true),
            Err(e) => {
                debug!("{} not ready: {}", target, e);
                Ok(false)
            }
        }
    })
    .await
}
