//! CLI for waitup.

mod commands;
mod duration;
mod exit;
mod options;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use waitup_core::config::{self, WaitupConfig};
use waitup_core::logging;

use commands::{
    dns_probes, http_probes, run_completions, run_man, run_wait, tcp_probes, DnsArgs, HttpArgs,
    TcpArgs,
};
use options::GlobalArgs;

/// Top-level CLI for waitup.
#[derive(Debug, Parser)]
#[command(name = "waitup", version)]
#[command(
    about = "waitup: wait for TCP ports, HTTP endpoints and DNS records to become ready",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Wait until TCP ports accept connections.
    Tcp(TcpArgs),

    /// Wait until HTTP endpoints answer with the expected status (and body).
    Http(HttpArgs),

    /// Wait until host names resolve (optionally to given addresses).
    Dns(DnsArgs),

    /// Print a shell completion script to stdout.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff) to stdout.
    Man,
}

/// Parse arguments, run the command and return the process exit code.
pub async fn run_from_args() -> i32 {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => exit::SUCCESS,
        Err(err) => exit::report(&err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let probes = match cli.command {
        CliCommand::Completions { shell } => return run_completions(shell),
        CliCommand::Man => return run_man(),
        CliCommand::Tcp(args) => tcp_probes(args),
        CliCommand::Http(args) => http_probes(args),
        CliCommand::Dns(args) => dns_probes(args),
    };

    // An explicit --config must load. At the default location a missing or
    // unwritable file falls back to defaults, but a malformed one is an error.
    let (cfg, config_err) = match &cli.global.config {
        Some(path) => (config::load_from_path(path)?, None),
        None => config::load_or_init()?,
    };

    init_logging(&cli.global, &cfg);
    match config_err {
        Some(e) => tracing::debug!("config unavailable, using built-in defaults: {:#}", e),
        None => tracing::debug!("loaded config: {:?}", cfg),
    }

    let options = cli.global.retry_options(&cfg)?;
    tracing::debug!(?options, "retry options");

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    run_wait(&cancel, probes, &options).await
}

fn init_logging(global: &GlobalArgs, cfg: &WaitupConfig) {
    let verbosity = global.verbosity();
    if global.log_file || cfg.log_to_file {
        if logging::init_logging_file(verbosity).is_ok() {
            return;
        }
    }
    logging::init_logging_stderr(verbosity);
}

/// Ctrl-C cancels the root token; every loop stops at its next suspension point.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping");
            cancel.cancel();
        }
    });
}

#[cfg(test)]
mod tests;
