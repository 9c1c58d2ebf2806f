//! TCP probe: ready once a connection to `host:port` can be established.

use anyhow::{bail, Context};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use super::{ExpectedFailure, Probe, ProbeError};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Per-attempt connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn identity(&self) -> anyhow::Result<String> {
        let (host, port) = self
            .address
            .rsplit_once(':')
            .with_context(|| format!("invalid address {:?}: expected host:port", self.address))?;
        if host.is_empty() {
            bail!("invalid address {:?}: missing host", self.address);
        }
        port.parse::<u16>()
            .with_context(|| format!("invalid port in address {:?}", self.address))?;
        Ok(self.address.clone())
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), ProbeError> {
        let connect = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect(self.address.as_str()),
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProbeError::Cancelled),
            res = connect => match res {
                Ok(Ok(_stream)) => Ok(()),
                Ok(Err(e)) => Err(ExpectedFailure::new("failed to establish a tcp connection")
                    .with_detail("address", &self.address)
                    .with_detail("reason", e)
                    .into()),
                Err(_) => Err(ExpectedFailure::new("timed out while connecting")
                    .with_detail("address", &self.address)
                    .with_detail("timeout", format!("{:?}", self.connect_timeout))
                    .into()),
            },
        }
    }
}
