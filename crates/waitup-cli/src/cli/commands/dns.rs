//! `waitup dns` – wait for host names to resolve.

use clap::Args;
use std::net::IpAddr;
use std::sync::Arc;
use waitup_core::probe::DnsProbe;
use waitup_core::Probe;

#[derive(Debug, Args)]
pub struct DnsArgs {
    /// Host names to resolve.
    #[arg(required = true, value_name = "HOST")]
    pub hosts: Vec<String>,

    /// Address that must appear in the answer (repeatable).
    #[arg(long = "expect-addr", value_name = "IP")]
    pub expect_addrs: Vec<IpAddr>,
}

pub fn dns_probes(args: DnsArgs) -> Vec<Arc<dyn Probe>> {
    args.hosts
        .into_iter()
        .map(|host| {
            Arc::new(DnsProbe::new(host).with_expect_addrs(args.expect_addrs.iter().copied()))
                as Arc<dyn Probe>
        })
        .collect()
}
