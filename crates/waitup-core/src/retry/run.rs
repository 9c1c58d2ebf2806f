//! Retry loop: drive one probe until it reaches its goal, times out, or is cancelled.

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

use super::classify::{is_terminal, log_outcome, AttemptOutcome};
use super::error::WaitError;
use super::options::RetryOptions;
use crate::probe::Probe;

/// Run `probe` until it succeeds (or, with `invert_check`, until it fails).
///
/// The timeout is wall-clock from the call, not per attempt. Attempts are
/// strictly sequential. When the deadline passes mid-attempt the probe's
/// token is cancelled and the attempt is awaited, never dropped.
///
/// Returns [`WaitError::Identity`] without attempting anything if the probe
/// cannot describe itself, [`WaitError::TimedOut`] at the deadline, and
/// [`WaitError::Cancelled`] when `cancel` fires.
pub async fn run(
    cancel: &CancellationToken,
    probe: &dyn Probe,
    options: &RetryOptions,
) -> Result<(), WaitError> {
    let identity = probe.identity().map_err(WaitError::Identity)?;
    let span = tracing::info_span!("probe", identity = %identity);
    drive(cancel, probe, options, &identity).instrument(span).await
}

async fn drive(
    cancel: &CancellationToken,
    probe: &dyn Probe,
    options: &RetryOptions,
    identity: &str,
) -> Result<(), WaitError> {
    // Cancelled at the deadline, when `cancel` fires, and on every return.
    let scope = cancel.child_token();
    let _release = scope.clone().drop_guard();
    let deadline = deadline_after(options);
    let mut failed_attempts: u32 = 0;

    loop {
        info!(
            attempt = failed_attempts.saturating_add(1),
            "checking {} ...", identity
        );

        let check = probe.check(&scope);
        tokio::pin!(check);
        let finished = tokio::select! {
            res = &mut check => Some(res),
            _ = expired(deadline) => None,
        };
        let result = match finished {
            Some(res) => res,
            None => {
                scope.cancel();
                check.await
            }
        };

        let outcome = AttemptOutcome::from(result);
        log_outcome(identity, &outcome);
        if is_terminal(&outcome, options.invert_check()) {
            if options.invert_check() {
                info!("{} is no longer ready", identity);
            } else {
                info!("{} is ready", identity);
            }
            return Ok(());
        }

        let wait = options.delay(failed_attempts);
        failed_attempts = failed_attempts.saturating_add(1);
        debug!(delay = ?wait, "waiting before next attempt");

        tokio::select! {
            biased;
            _ = scope.cancelled() => return Err(stop_reason(cancel, options)),
            _ = expired(deadline) => return Err(WaitError::TimedOut { timeout: options.timeout() }),
            _ = sleep(wait) => {}
        }
    }
}

fn deadline_after(options: &RetryOptions) -> Option<Instant> {
    if options.timeout().is_zero() {
        return None;
    }
    Instant::now().checked_add(options.timeout())
}

/// Resolves at the deadline; never resolves without one.
async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// The scope is cancelled either by the caller or by our own deadline.
fn stop_reason(cancel: &CancellationToken, options: &RetryOptions) -> WaitError {
    if cancel.is_cancelled() {
        WaitError::Cancelled
    } else {
        WaitError::TimedOut {
            timeout: options.timeout(),
        }
    }
}
