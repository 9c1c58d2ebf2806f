use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::options::OptionsError;

/// Rule governing the delay between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffPolicy {
    /// Always wait the base interval.
    #[default]
    Linear,
    /// Multiply the base interval by `coefficient^attempt`, capped at the max interval.
    Exponential,
}

impl BackoffPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackoffPolicy::Linear => "linear",
            BackoffPolicy::Exponential => "exponential",
        }
    }
}

impl fmt::Display for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffPolicy {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(BackoffPolicy::Linear),
            "exponential" => Ok(BackoffPolicy::Exponential),
            other => Err(OptionsError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Compute the wait before the next attempt.
///
/// `attempt` is the number of failed attempts so far (0-based), so the first
/// retry under `Exponential` waits exactly `base`. The result never exceeds
/// `max` for the exponential policy, whatever the attempt count.
pub fn delay(
    attempt: u32,
    policy: BackoffPolicy,
    base: Duration,
    coefficient: f64,
    max: Duration,
) -> Duration {
    match policy {
        BackoffPolicy::Linear => base,
        BackoffPolicy::Exponential => {
            let exp = attempt.min(i32::MAX as u32) as i32;
            let factor = coefficient.powi(exp);
            if factor <= 1.0 {
                return base.min(max);
            }
            let secs = base.as_secs_f64() * factor;
            // NaN and infinity both land on the cap.
            if !(secs < max.as_secs_f64()) {
                return max;
            }
            Duration::from_secs_f64(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(250);
    const MAX: Duration = Duration::from_secs(5);

    #[test]
    fn linear_ignores_attempt() {
        for attempt in [0, 1, 2, 10, 1_000, u32::MAX] {
            assert_eq!(delay(attempt, BackoffPolicy::Linear, BASE, 2.0, MAX), BASE);
        }
    }

    #[test]
    fn exponential_first_retry_uses_base() {
        assert_eq!(delay(0, BackoffPolicy::Exponential, BASE, 2.0, MAX), BASE);
        assert_eq!(
            delay(0, BackoffPolicy::Exponential, Duration::from_secs(1), 3.5, MAX),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn exponential_grows_by_coefficient() {
        assert_eq!(
            delay(1, BackoffPolicy::Exponential, BASE, 2.0, MAX),
            Duration::from_millis(500)
        );
        assert_eq!(
            delay(3, BackoffPolicy::Exponential, BASE, 2.0, MAX),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn exponential_is_monotonic_and_capped() {
        let mut prev = Duration::ZERO;
        for attempt in 0..200 {
            let d = delay(attempt, BackoffPolicy::Exponential, BASE, 1.7, MAX);
            assert!(d >= prev, "attempt {attempt}: {d:?} < {prev:?}");
            assert!(d <= MAX);
            prev = d;
        }
        assert_eq!(prev, MAX);
    }

    #[test]
    fn exponential_huge_attempt_does_not_overflow() {
        assert_eq!(
            delay(u32::MAX, BackoffPolicy::Exponential, BASE, 10.0, MAX),
            MAX
        );
    }

    #[test]
    fn exponential_base_above_max_is_capped() {
        let d = delay(
            0,
            BackoffPolicy::Exponential,
            Duration::from_secs(10),
            2.0,
            MAX,
        );
        assert_eq!(d, MAX);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("linear".parse::<BackoffPolicy>().unwrap(), BackoffPolicy::Linear);
        assert_eq!(
            "Exponential".parse::<BackoffPolicy>().unwrap(),
            BackoffPolicy::Exponential
        );
        assert!(matches!(
            "fibonacci".parse::<BackoffPolicy>(),
            Err(OptionsError::UnknownPolicy(p)) if p == "fibonacci"
        ));
    }
}
