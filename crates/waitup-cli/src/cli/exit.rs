//! Process exit codes.

use waitup_core::WaitError;

pub const SUCCESS: i32 = 0;
/// Any unrecoverable error: bad flags, bad config, misconfigured probe.
pub const ERROR: i32 = 1;
/// The timeout elapsed before every target was ready.
pub const TIMED_OUT: i32 = 124;
/// Stopped by Ctrl-C.
pub const INTERRUPTED: i32 = 130;

pub fn code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<WaitError>() {
        Some(WaitError::TimedOut { .. }) => TIMED_OUT,
        Some(WaitError::Cancelled) => INTERRUPTED,
        _ => ERROR,
    }
}

/// Print the error to stderr and return its exit code.
pub fn report(err: &anyhow::Error) -> i32 {
    eprintln!("waitup error: {:#}", err);
    code_for(err)
}
