//! Classify a probe attempt and decide whether it ends the loop.

use tracing::{error, info};

use crate::probe::{ExpectedFailure, ProbeError};

/// Outcome of one probe invocation.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success,
    ExpectedFailure(ExpectedFailure),
    UnexpectedFailure(anyhow::Error),
    Cancelled,
}

impl From<Result<(), ProbeError>> for AttemptOutcome {
    fn from(res: Result<(), ProbeError>) -> Self {
        match res {
            Ok(()) => AttemptOutcome::Success,
            Err(ProbeError::Expected(e)) => AttemptOutcome::ExpectedFailure(e),
            Err(ProbeError::Unexpected(e)) => AttemptOutcome::UnexpectedFailure(e),
            Err(ProbeError::Cancelled) => AttemptOutcome::Cancelled,
        }
    }
}

/// Whether `outcome` ends the loop successfully.
///
/// Normally only a success is terminal. With `invert_check` a success means
/// "still up", so it is the failures that end the wait. A cancelled attempt
/// is never terminal; the loop then reports the cancellation itself.
pub fn is_terminal(outcome: &AttemptOutcome, invert_check: bool) -> bool {
    match outcome {
        AttemptOutcome::Success => !invert_check,
        AttemptOutcome::ExpectedFailure(_) | AttemptOutcome::UnexpectedFailure(_) => invert_check,
        AttemptOutcome::Cancelled => false,
    }
}

/// Log an attempt's outcome. Expected failures go out at info with their
/// details as a field; other errors at error; cancellation is not logged.
pub fn log_outcome(identity: &str, outcome: &AttemptOutcome) {
    match outcome {
        AttemptOutcome::Success | AttemptOutcome::Cancelled => {}
        AttemptOutcome::ExpectedFailure(e) => {
            info!(
                identity = %identity,
                details = %e.details_display(),
                "{}",
                e.message()
            );
        }
        AttemptOutcome::UnexpectedFailure(e) => {
            let reason = format!("{:#}", e);
            error!(identity = %identity, error = %reason, "unexpected error");
        }
    }
}
