pub mod config;
pub mod logging;
pub mod probe;
pub mod retry;

pub use probe::{ExpectedFailure, Probe, ProbeError};
pub use retry::{run, run_all, wait_for, BackoffPolicy, RetryOptions, WaitError};
pub use tokio_util::sync::CancellationToken;
