//! Readiness probes.
//!
//! A [`Probe`] answers one question about one external resource: "is it
//! ready yet?". The retry engine only knows this trait; what "ready" means
//! for a TCP port, an HTTP endpoint or a DNS record lives in the
//! submodules.
//!
//! Cancellation is cooperative. A probe receives the run's token and should
//! return [`ProbeError::Cancelled`] once it fires, but the engine never
//! aborts an attempt that is already in flight.

mod dns;
mod http;
mod tcp;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use dns::DnsProbe;
pub use http::{HttpProbe, DEFAULT_REQUEST_TIMEOUT};
pub use tcp::{TcpProbe, DEFAULT_CONNECT_TIMEOUT};

/// A readiness check against one external resource.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short label for the target, used for logging only.
    ///
    /// An error here means the probe is misconfigured; the engine returns it
    /// without making a single attempt.
    fn identity(&self) -> anyhow::Result<String>;

    /// Make one readiness attempt.
    async fn check(&self, cancel: &CancellationToken) -> Result<(), ProbeError>;
}

/// Why a single attempt did not succeed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The resource answered but is not in the desired state yet.
    #[error(transparent)]
    Expected(#[from] ExpectedFailure),
    /// Anything else; may point at a misconfiguration.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
    /// The probe observed the cancellation token mid-attempt.
    #[error("probe cancelled")]
    Cancelled,
}

/// Structured "not ready yet" signal.
///
/// Details are kept apart from the message so sinks can render them as
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExpectedFailure {
    message: String,
    details: Vec<(String, String)>,
}

impl ExpectedFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.push((key.into(), value.to_string()));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[(String, String)] {
        &self.details
    }

    /// Look up the first detail with the given key.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the details as `key=value` pairs for a log field.
    pub fn details_display(&self) -> DetailsDisplay<'_> {
        DetailsDisplay(&self.details)
    }
}

/// `key=value, key=value` view of expected-failure details.
pub struct DetailsDisplay<'a>(&'a [(String, String)]);

impl fmt::Display for DetailsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}
