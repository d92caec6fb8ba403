use std::time::Duration;

use clap::{ArgAction, Parser};
use pingr_common::config::Config;

/// Hosts are read from standard input, one per line. Reachable ones are
/// written to standard output in the order their probes finish.
///
/// ICMP needs raw sockets: run as root or grant CAP_NET_RAW.
#[derive(Parser, Debug)]
#[command(name = "pingr")]
#[command(about = "Report which hosts answer ICMP echo.", long_about = None)]
pub struct CommandLine {
    /// Maximum number of probes in flight [default: one per host]
    #[arg(short = 'c', long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Stop waiting for the whole batch after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Print run counters to stderr when done
    #[arg(short, long)]
    pub summary: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Probe count and timeout are fixed; only scheduling is configurable.
    pub fn to_config(&self) -> Config {
        Config {
            max_concurrency: self.max_concurrency,
            deadline: self.deadline.map(Duration::from_secs),
            ..Config::default()
        }
    }
}
