//! Scripted probes for engine tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::probe::{ExpectedFailure, Probe, ProbeError};

/// Probe whose answers are fixed up front. Counts every `check` call.
pub(crate) struct ScriptedProbe {
    name: &'static str,
    identity_error: Option<&'static str>,
    /// 1-based attempt from which checks succeed; `None` = never.
    succeed_from: Option<usize>,
    attempt_delay: Duration,
    attempts: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    fn new(name: &'static str, succeed_from: Option<usize>) -> Self {
        Self {
            name,
            identity_error: None,
            succeed_from,
            attempt_delay: Duration::ZERO,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always_ok(name: &'static str) -> Self {
        Self::new(name, Some(1))
    }

    pub fn always_fail(name: &'static str) -> Self {
        Self::new(name, None)
    }

    /// Fails `failures` times, then succeeds.
    pub fn ok_after(name: &'static str, failures: usize) -> Self {
        Self::new(name, Some(failures + 1))
    }

    pub fn broken_identity(name: &'static str, message: &'static str) -> Self {
        Self {
            identity_error: Some(message),
            ..Self::new(name, Some(1))
        }
    }

    /// Each attempt takes this long and ignores cancellation.
    pub fn with_attempt_delay(mut self, delay: Duration) -> Self {
        self.attempt_delay = delay;
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn identity(&self) -> anyhow::Result<String> {
        match self.identity_error {
            Some(msg) => Err(anyhow::anyhow!(msg)),
            None => Ok(self.name.to_string()),
        }
    }

    async fn check(&self, _cancel: &CancellationToken) -> Result<(), ProbeError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.attempt_delay.is_zero() {
            tokio::time::sleep(self.attempt_delay).await;
        }
        match self.succeed_from {
            Some(from) if n >= from => Ok(()),
            _ => Err(ExpectedFailure::new("not ready yet")
                .with_detail("probe", self.name)
                .with_detail("attempt", n)
                .into()),
        }
    }
}
