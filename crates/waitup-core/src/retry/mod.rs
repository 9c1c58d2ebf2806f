//! Retry engine.
//!
//! Drives readiness probes on a schedule: the backoff calculator decides
//! how long to wait between attempts, the single-target loop (`run`)
//! applies it to one probe under a wall-clock deadline, and the parallel
//! aggregator (`run_all`) runs one loop per probe with first-error-wins
//! semantics.

mod classify;
mod error;
mod options;
mod parallel;
mod policy;
mod run;
#[cfg(test)]
mod testing;

pub use classify::{is_terminal, log_outcome, AttemptOutcome};
pub use error::WaitError;
pub use options::{
    duration_from_secs, OptionsError, RetryOptions, RetryOptionsBuilder, DEFAULT_BACKOFF_COEFFICIENT,
    DEFAULT_BACKOFF_MAX_INTERVAL, DEFAULT_INTERVAL, DEFAULT_TIMEOUT,
};
pub use parallel::{run_all, wait_for};
pub use policy::{delay, BackoffPolicy};
pub use run::run;
