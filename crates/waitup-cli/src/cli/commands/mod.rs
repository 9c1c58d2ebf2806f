//! CLI command handlers. Each probe kind is in its own file.

mod completions;
mod dns;
mod http;
mod man;
mod tcp;

pub use completions::run_completions;
pub use dns::{dns_probes, DnsArgs};
pub use http::{http_probes, HttpArgs};
pub use man::run_man;
pub use tcp::{tcp_probes, TcpArgs};

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use waitup_core::{Probe, RetryOptions};

/// Wait for every probe; one probe runs inline, several run in parallel.
pub async fn run_wait(
    cancel: &CancellationToken,
    probes: Vec<Arc<dyn Probe>>,
    options: &RetryOptions,
) -> Result<()> {
    let started = Instant::now();
    let targets = probes.len();
    waitup_core::wait_for(cancel, probes, options).await?;
    tracing::info!(
        targets,
        elapsed = ?started.elapsed(),
        "done waiting"
    );
    Ok(())
}
