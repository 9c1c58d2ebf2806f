//! `waitup http` – wait for HTTP endpoints.

use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use waitup_core::probe::HttpProbe;
use waitup_core::Probe;

use crate::cli::duration::parse_duration;

#[derive(Debug, Args)]
pub struct HttpArgs {
    /// Target URLs (http or https).
    #[arg(required = true, value_name = "URL")]
    pub urls: Vec<String>,

    /// Status code that counts as ready.
    #[arg(long, default_value_t = 200, value_name = "CODE")]
    pub expect_status: u32,

    /// Substring the response body must contain.
    #[arg(long, value_name = "TEXT")]
    pub expect_body: Option<String>,

    /// Timeout for each request.
    #[arg(long, default_value = "5s", value_parser = parse_duration, value_name = "DURATION")]
    pub request_timeout: Duration,
}

pub fn http_probes(args: HttpArgs) -> Vec<Arc<dyn Probe>> {
    args.urls
        .into_iter()
        .map(|url| {
            let mut probe = HttpProbe::new(url)
                .with_expect_status(args.expect_status)
                .with_request_timeout(args.request_timeout);
            if let Some(needle) = &args.expect_body {
                probe = probe.with_expect_body(needle.clone());
            }
            Arc::new(probe) as Arc<dyn Probe>
        })
        .collect()
}
