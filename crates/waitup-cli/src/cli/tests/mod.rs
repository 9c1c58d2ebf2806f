//! CLI parse tests (split by area).

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn command(args: &[&str]) -> CliCommand {
    parse(args).command
}
