use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::retry::{
    duration_from_secs, BackoffPolicy, OptionsError, RetryOptions, RetryOptionsBuilder,
    DEFAULT_BACKOFF_COEFFICIENT, DEFAULT_BACKOFF_MAX_INTERVAL, DEFAULT_INTERVAL, DEFAULT_TIMEOUT,
};

/// Retry defaults (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total wall-clock budget in seconds; 0 = wait forever.
    pub timeout_secs: f64,
    /// Base delay between attempts in seconds.
    pub interval_secs: f64,
    /// Wait for the target to stop being ready.
    pub invert_check: bool,
    pub backoff_policy: BackoffPolicy,
    /// Growth factor per failed attempt for the exponential policy.
    pub backoff_coefficient: f64,
    /// Cap for exponential backoff, in seconds.
    pub backoff_max_interval_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            interval_secs: DEFAULT_INTERVAL.as_secs_f64(),
            invert_check: false,
            backoff_policy: BackoffPolicy::Linear,
            backoff_coefficient: DEFAULT_BACKOFF_COEFFICIENT,
            backoff_max_interval_secs: DEFAULT_BACKOFF_MAX_INTERVAL.as_secs_f64(),
        }
    }
}

impl RetryConfig {
    /// Seed a builder from these values; callers layer CLI flags on top and `build()`.
    pub fn to_builder(&self) -> Result<RetryOptionsBuilder, OptionsError> {
        Ok(RetryOptions::builder()
            .timeout(duration_from_secs("timeout_secs", self.timeout_secs)?)
            .interval(duration_from_secs("interval_secs", self.interval_secs)?)
            .invert_check(self.invert_check)
            .backoff_policy(self.backoff_policy)
            .backoff_coefficient(self.backoff_coefficient)
            .backoff_max_interval(duration_from_secs(
                "backoff_max_interval_secs",
                self.backoff_max_interval_secs,
            )?))
    }
}

/// Global configuration loaded from `~/.config/waitup/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitupConfig {
    /// Write logs to `~/.local/state/waitup/waitup.log` instead of stderr.
    #[serde(default)]
    pub log_to_file: bool,
    /// Optional retry defaults; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl WaitupConfig {
    pub fn retry_builder(&self) -> Result<RetryOptionsBuilder, OptionsError> {
        self.retry.clone().unwrap_or_default().to_builder()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("waitup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
///
/// Returns the built-in defaults together with the reason when the file
/// can't be located, read or created. A file that exists but doesn't parse
/// is an error.
pub fn load_or_init() -> Result<(WaitupConfig, Option<anyhow::Error>)> {
    match config_path() {
        Ok(path) => load_or_init_at(&path),
        Err(e) => Ok((WaitupConfig::default(), Some(e))),
    }
}

/// `load_or_init` for an explicit default location.
pub fn load_or_init_at(path: &Path) -> Result<(WaitupConfig, Option<anyhow::Error>)> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(match write_default(path) {
                Ok(cfg) => (cfg, None),
                Err(e) => (WaitupConfig::default(), Some(e)),
            });
        }
        Err(e) => {
            let e = anyhow::Error::new(e).context(format!("reading config {}", path.display()));
            return Ok((WaitupConfig::default(), Some(e)));
        }
    };
    Ok((parse_config(&data, path)?, None))
}

fn write_default(path: &Path) -> Result<WaitupConfig> {
    let default_cfg = WaitupConfig::default();
    let toml = toml::to_string_pretty(&default_cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml).with_context(|| format!("writing config {}", path.display()))?;
    tracing::debug!("created default config at {}", path.display());
    Ok(default_cfg)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<WaitupConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&data, path)
}

fn parse_config(data: &str, path: &Path) -> Result<WaitupConfig> {
    toml::from_str(data).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn default_config_values() {
        let cfg = WaitupConfig::default();
        assert!(cfg.retry.is_none());
        assert!(!cfg.log_to_file);
        let opts = cfg.retry_builder().unwrap().build().unwrap();
        assert_eq!(opts, RetryOptions::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = WaitupConfig {
            retry: Some(RetryConfig::default()),
            log_to_file: true,
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: WaitupConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_retry_section() {
        let toml = r#"
            [retry]
            timeout_secs = 30
            backoff_policy = "exponential"
        "#;
        let cfg: WaitupConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.backoff_policy, BackoffPolicy::Exponential);
        assert_eq!(retry.interval_secs, 1.0);
        let opts = cfg.retry_builder().unwrap().build().unwrap();
        assert_eq!(opts.timeout(), Duration::from_secs(30));
        assert_eq!(opts.backoff_max_interval(), Duration::from_secs(5));
    }

    #[test]
    fn config_toml_rejects_unknown_policy() {
        let toml = r#"
            [retry]
            backoff_policy = "fibonacci"
        "#;
        assert!(toml::from_str::<WaitupConfig>(toml).is_err());
    }

    #[test]
    fn config_negative_duration_is_an_options_error() {
        let cfg = WaitupConfig {
            retry: Some(RetryConfig {
                interval_secs: -1.0,
                ..RetryConfig::default()
            }),
            log_to_file: false,
        };
        assert!(matches!(
            cfg.retry_builder(),
            Err(OptionsError::InvalidDuration { field: "interval_secs", .. })
        ));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_to_file = true\n[retry]\ninvert_check = true\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert!(cfg.log_to_file);
        assert!(cfg.retry.unwrap().invert_check);
    }

    #[test]
    fn load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn load_or_init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waitup").join("config.toml");
        let (cfg, fallback) = load_or_init_at(&path).unwrap();
        assert!(fallback.is_none());
        assert_eq!(cfg, WaitupConfig::default());
        assert_eq!(load_from_path(&path).unwrap(), cfg);
    }

    #[test]
    fn load_or_init_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]
timeout_secs = 3
").unwrap();
        let (cfg, fallback) = load_or_init_at(&path).unwrap();
        assert!(fallback.is_none());
        assert_eq!(cfg.retry.unwrap().timeout_secs, 3.0);
    }

    #[test]
    fn load_or_init_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[retry]\nbackoff_policy = \"fibonacci\"\n").unwrap();
        let err = load_or_init_at(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"), "got {err:#}");
    }

    #[test]
    fn load_or_init_falls_back_when_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be can be neither read nor created.
        let path = dir.path().join("config.toml");
        fs::create_dir(&path).unwrap();
        let (cfg, fallback) = load_or_init_at(&path).unwrap();
        assert_eq!(cfg, WaitupConfig::default());
        assert!(fallback.is_some());
    }
}
