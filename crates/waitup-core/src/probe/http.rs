//! HTTP probe: ready once a GET returns the expected status (and body).
//!
//! Uses the curl crate (libcurl). The transfer is blocking, so each attempt
//! runs on `spawn_blocking`. When the attempt ends early (cancelled or
//! dropped) an abort flag is raised and curl's progress callback stops the
//! transfer, closing the connection.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{ExpectedFailure, Probe, ProbeError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Bytes of response body kept for the `expect_body` match.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    expect_status: u32,
    expect_body: Option<String>,
    request_timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expect_status: 200,
            expect_body: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_expect_status(mut self, status: u32) -> Self {
        self.expect_status = status;
        self
    }

    /// Require the response body to contain this substring.
    pub fn with_expect_body(mut self, needle: impl Into<String>) -> Self {
        self.expect_body = Some(needle.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

struct HttpResponse {
    status: u32,
    body: String,
}

/// Raises the abort flag when the attempt goes away, finished or not.
struct AbortOnDrop(Arc<AtomicBool>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn get(url: &str, timeout: Duration, abort: &AtomicBool) -> Result<HttpResponse, curl::Error> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.progress(true)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            let room = MAX_BODY_BYTES.saturating_sub(body.len());
            body.extend_from_slice(&data[..data.len().min(room)]);
            Ok(data.len())
        })?;
        transfer.progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse {
        status,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

#[async_trait]
impl Probe for HttpProbe {
    fn identity(&self) -> anyhow::Result<String> {
        let parsed = Url::parse(&self.url).with_context(|| format!("invalid URL {:?}", self.url))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => bail!("unsupported scheme {:?} in URL {:?}", other, self.url),
        }
        if parsed.host_str().is_none() {
            bail!("URL {:?} has no host", self.url);
        }
        Ok(self.url.clone())
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), ProbeError> {
        let url = self.url.clone();
        let timeout = self.request_timeout;
        let abort = Arc::new(AtomicBool::new(false));
        let _guard = AbortOnDrop(abort.clone());
        let fetch = tokio::task::spawn_blocking(move || get(&url, timeout, &abort));

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            joined = fetch => joined,
        };
        let result = joined.map_err(|e| anyhow!("http request task failed: {}", e))?;

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                return Err(ExpectedFailure::new("failed to make the http request")
                    .with_detail("url", &self.url)
                    .with_detail("reason", e)
                    .into());
            }
        };

        if response.status != self.expect_status {
            return Err(ExpectedFailure::new("the status code doesn't match the expectation")
                .with_detail("url", &self.url)
                .with_detail("expected", self.expect_status)
                .with_detail("actual", response.status)
                .into());
        }

        if let Some(needle) = &self.expect_body {
            if !response.body.contains(needle.as_str()) {
                return Err(ExpectedFailure::new("the response body doesn't match the expectation")
                    .with_detail("url", &self.url)
                    .with_detail("expect_body", needle)
                    .into());
            }
        }

        Ok(())
    }
}
