//! DNS probe: ready once a host resolves (optionally to a given set of addresses).

use anyhow::bail;
use async_trait::async_trait;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

use super::{ExpectedFailure, Probe, ProbeError};

#[derive(Debug, Clone)]
pub struct DnsProbe {
    host: String,
    expect_addrs: Vec<IpAddr>,
}

impl DnsProbe {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            expect_addrs: Vec::new(),
        }
    }

    /// Every address listed here must be in the answer.
    pub fn with_expect_addrs(mut self, addrs: impl IntoIterator<Item = IpAddr>) -> Self {
        self.expect_addrs.extend(addrs);
        self
    }
}

fn join_addrs(addrs: &[IpAddr]) -> String {
    addrs
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Probe for DnsProbe {
    fn identity(&self) -> anyhow::Result<String> {
        if self.host.trim().is_empty() {
            bail!("empty host name");
        }
        if self.host.chars().any(char::is_whitespace) {
            bail!("invalid host name {:?}", self.host);
        }
        Ok(self.host.clone())
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), ProbeError> {
        let lookup = tokio::net::lookup_host((self.host.as_str(), 0));
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            res = lookup => res,
        };

        let mut actual: Vec<IpAddr> = match resolved {
            Ok(addrs) => addrs.map(|sa| sa.ip()).collect(),
            Err(e) => {
                return Err(ExpectedFailure::new("failed to resolve the host")
                    .with_detail("host", &self.host)
                    .with_detail("reason", e)
                    .into());
            }
        };
        actual.sort();
        actual.dedup();

        if actual.is_empty() {
            return Err(ExpectedFailure::new("the host resolved to no addresses")
                .with_detail("host", &self.host)
                .into());
        }

        let missing = self.expect_addrs.iter().any(|want| !actual.contains(want));
        if missing {
            return Err(ExpectedFailure::new("the resolved addresses don't match the expectation")
                .with_detail("host", &self.host)
                .with_detail("expected", join_addrs(&self.expect_addrs))
                .with_detail("actual", join_addrs(&actual))
                .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rejects_blank_host() {
        assert_eq!(DnsProbe::new("db.internal").identity().unwrap(), "db.internal");
        assert!(DnsProbe::new("").identity().is_err());
        assert!(DnsProbe::new("  ").identity().is_err());
        assert!(DnsProbe::new("db internal").identity().is_err());
    }

    #[tokio::test]
    async fn ip_literal_resolves_to_itself() {
        let probe = DnsProbe::new("127.0.0.1").with_expect_addrs(["127.0.0.1".parse::<IpAddr>().unwrap()]);
        probe.check(&CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn unexpected_answer_is_expected_failure() {
        let probe = DnsProbe::new("127.0.0.1").with_expect_addrs(["10.9.8.7".parse::<IpAddr>().unwrap()]);
        match probe.check(&CancellationToken::new()).await {
            Err(ProbeError::Expected(e)) => {
                assert_eq!(e.detail("expected"), Some("10.9.8.7"));
                assert_eq!(e.detail("actual"), Some("127.0.0.1"));
            }
            other => panic!("expected Expected failure, got {:?}", other),
        }
    }
}
