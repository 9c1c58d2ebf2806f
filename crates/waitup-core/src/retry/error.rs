//! Terminal errors of a wait.

use std::time::Duration;
use thiserror::Error;

/// Why a wait ended without reaching its goal.
///
/// Probe failures never show up here: they only drive retries.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The probe could not describe its target (e.g. malformed address).
    /// Returned before any attempt is made.
    #[error(transparent)]
    Identity(anyhow::Error),
    /// The wall-clock timeout elapsed.
    #[error("timed out after {timeout:?}")]
    TimedOut { timeout: Duration },
    /// The caller's cancellation token fired.
    #[error("cancelled")]
    Cancelled,
    /// A spawned loop panicked.
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

impl WaitError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled)
    }
}
