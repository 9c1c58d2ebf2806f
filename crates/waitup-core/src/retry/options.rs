//! Validated retry configuration shared by every loop of a run.

use std::time::Duration;
use thiserror::Error;

use super::policy::{self, BackoffPolicy};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_BACKOFF_COEFFICIENT: f64 = 2.0;
pub const DEFAULT_BACKOFF_MAX_INTERVAL: Duration = Duration::from_secs(5);

/// Rejected option combination, reported before any probe runs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptionsError {
    #[error("unknown backoff policy {0:?} (expected \"linear\" or \"exponential\")")]
    UnknownPolicy(String),
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("backoff coefficient must be a finite number >= 1.0, got {0}")]
    InvalidCoefficient(f64),
    #[error(
        "backoff max interval ({max_interval:?}) must be greater than or equal to the interval ({interval:?})"
    )]
    MaxIntervalTooSmall {
        max_interval: Duration,
        interval: Duration,
    },
    #[error("{field} must be a non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },
}

/// Options for a run. Immutable once built; construct with
/// [`RetryOptions::builder`] or take the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryOptions {
    timeout: Duration,
    interval: Duration,
    invert_check: bool,
    backoff_policy: BackoffPolicy,
    backoff_coefficient: f64,
    backoff_max_interval: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            invert_check: false,
            backoff_policy: BackoffPolicy::Linear,
            backoff_coefficient: DEFAULT_BACKOFF_COEFFICIENT,
            backoff_max_interval: DEFAULT_BACKOFF_MAX_INTERVAL,
        }
    }
}

impl RetryOptions {
    pub fn builder() -> RetryOptionsBuilder {
        RetryOptionsBuilder::default()
    }

    /// Total wall-clock budget. Zero means unbounded.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the probe stops succeeding instead of until it succeeds.
    pub fn invert_check(&self) -> bool {
        self.invert_check
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        self.backoff_policy
    }

    pub fn backoff_coefficient(&self) -> f64 {
        self.backoff_coefficient
    }

    pub fn backoff_max_interval(&self) -> Duration {
        self.backoff_max_interval
    }

    /// Wait before the next attempt after `failed_attempts` non-terminal attempts.
    pub fn delay(&self, failed_attempts: u32) -> Duration {
        policy::delay(
            failed_attempts,
            self.backoff_policy,
            self.interval,
            self.backoff_coefficient,
            self.backoff_max_interval,
        )
    }
}

/// Builder for [`RetryOptions`]; every unset field keeps its default.
#[derive(Debug, Clone, Default)]
pub struct RetryOptionsBuilder {
    opts: RetryOptions,
}

impl RetryOptionsBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.opts.interval = interval;
        self
    }

    pub fn invert_check(mut self, invert_check: bool) -> Self {
        self.opts.invert_check = invert_check;
        self
    }

    pub fn backoff_policy(mut self, policy: BackoffPolicy) -> Self {
        self.opts.backoff_policy = policy;
        self
    }

    pub fn backoff_coefficient(mut self, coefficient: f64) -> Self {
        self.opts.backoff_coefficient = coefficient;
        self
    }

    pub fn backoff_max_interval(mut self, max_interval: Duration) -> Self {
        self.opts.backoff_max_interval = max_interval;
        self
    }

    pub fn build(self) -> Result<RetryOptions, OptionsError> {
        let opts = self.opts;
        if opts.interval.is_zero() {
            return Err(OptionsError::ZeroInterval);
        }
        if opts.backoff_policy == BackoffPolicy::Exponential {
            if !opts.backoff_coefficient.is_finite() || opts.backoff_coefficient < 1.0 {
                return Err(OptionsError::InvalidCoefficient(opts.backoff_coefficient));
            }
            if opts.backoff_max_interval < opts.interval {
                return Err(OptionsError::MaxIntervalTooSmall {
                    max_interval: opts.backoff_max_interval,
                    interval: opts.interval,
                });
            }
        }
        Ok(opts)
    }
}

/// Convert a seconds value from config into a `Duration`.
pub fn duration_from_secs(field: &'static str, secs: f64) -> Result<Duration, OptionsError> {
    Duration::try_from_secs_f64(secs).map_err(|_| OptionsError::InvalidDuration { field, value: secs })
}
