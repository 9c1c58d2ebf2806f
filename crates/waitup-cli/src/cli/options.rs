//! Global flags shared by every probe command, layered over the config file.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use waitup_core::config::WaitupConfig;
use waitup_core::logging::Verbosity;
use waitup_core::retry::OptionsError;
use waitup_core::{BackoffPolicy, RetryOptions};

use super::duration::parse_duration;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Total time to wait before giving up; 0 waits forever [default: 10s].
    #[arg(short = 't', long, global = true, value_parser = parse_duration, value_name = "DURATION")]
    pub timeout: Option<Duration>,

    /// Delay between attempts [default: 1s].
    #[arg(short = 'i', long, global = true, value_parser = parse_duration, value_name = "DURATION")]
    pub interval: Option<Duration>,

    /// Wait until the targets stop being ready (e.g. a port becomes free).
    #[arg(long, global = true)]
    pub invert_check: bool,

    /// Backoff between attempts: "linear" or "exponential" [default: linear].
    #[arg(long, global = true, value_name = "POLICY")]
    pub backoff_policy: Option<BackoffPolicy>,

    /// Growth factor per failed attempt for exponential backoff [default: 2.0].
    #[arg(long, global = true, value_name = "FACTOR")]
    pub backoff_exponential_coefficient: Option<f64>,

    /// Upper bound for exponential backoff [default: 5s].
    #[arg(long, global = true, value_parser = parse_duration, value_name = "DURATION")]
    pub backoff_exponential_max_interval: Option<Duration>,

    /// Turn logging off; the exit code and the final error line still report the result.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log to ~/.local/state/waitup/waitup.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Config file to use instead of ~/.config/waitup/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Merge flags over `cfg` and validate. Flags win over the config file.
    pub fn retry_options(&self, cfg: &WaitupConfig) -> Result<RetryOptions, OptionsError> {
        let mut builder = cfg.retry_builder()?;
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(interval) = self.interval {
            builder = builder.interval(interval);
        }
        if self.invert_check {
            builder = builder.invert_check(true);
        }
        if let Some(policy) = self.backoff_policy {
            builder = builder.backoff_policy(policy);
        }
        if let Some(coefficient) = self.backoff_exponential_coefficient {
            builder = builder.backoff_coefficient(coefficient);
        }
        if let Some(max_interval) = self.backoff_exponential_max_interval {
            builder = builder.backoff_max_interval(max_interval);
        }
        builder.build()
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
