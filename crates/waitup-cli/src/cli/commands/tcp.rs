//! `waitup tcp` – wait for TCP ports.

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use waitup_core::probe::TcpProbe;
use waitup_core::Probe;

use crate::cli::duration::parse_duration;

#[derive(Debug, Args)]
pub struct TcpArgs {
    /// Targets as host:port.
    #[arg(required = true, value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Timeout for each connection attempt.
    #[arg(long, default_value = "3s", value_parser = parse_duration, value_name = "DURATION")]
    pub connect_timeout: Duration,
}

pub fn tcp_probes(args: TcpArgs) -> Vec<Arc<dyn Probe>> {
    let connect_timeout = args.connect_timeout;
    args.addresses
        .into_iter()
        .map(|addr| {
            Arc::new(TcpProbe::new(addr).with_connect_timeout(connect_timeout)) as Arc<dyn Probe>
        })
        .collect()
}
