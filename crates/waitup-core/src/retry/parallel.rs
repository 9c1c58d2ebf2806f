//! Run several probes concurrently under one deadline; first error wins.
//!
//! One task per probe, all sharing a child of the caller's token. Results
//! are collected with `JoinSet::join_next` in completion order: the first
//! loop to end with an error is returned and the shared token is cancelled
//! so the rest stop issuing attempts. The others are detached rather than
//! aborted; an in-flight attempt finishes before its loop sees the
//! cancellation. If two loops fail at nearly the same time, which error is
//! returned depends on task completion order and is not deterministic.

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::error::WaitError;
use super::options::RetryOptions;
use super::run::run;
use crate::probe::Probe;

/// Wait for every probe. Returns `Ok(())` only after all loops succeeded.
pub async fn run_all(
    cancel: &CancellationToken,
    probes: Vec<Arc<dyn Probe>>,
    options: &RetryOptions,
) -> Result<(), WaitError> {
    let shared = cancel.child_token();
    let mut join_set = JoinSet::new();

    for probe in probes {
        let token = shared.clone();
        let options = *options;
        join_set.spawn(async move { run(&token, probe.as_ref(), &options).await });
    }

    while let Some(res) = join_set.join_next().await {
        let err = match res {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(join_err) => WaitError::TaskFailed(join_err.to_string()),
        };
        shared.cancel();
        join_set.detach_all();
        return Err(err);
    }

    Ok(())
}

/// Wait for `probes`: on the caller's task for a single probe, fanned out otherwise.
pub async fn wait_for(
    cancel: &CancellationToken,
    mut probes: Vec<Arc<dyn Probe>>,
    options: &RetryOptions,
) -> Result<(), WaitError> {
    if probes.len() == 1 {
        if let Some(probe) = probes.pop() {
            return run(cancel, probe.as_ref(), options).await;
        }
    }
    run_all(cancel, probes, options).await
}
