mod commands;
mod terminal;

use std::io;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use commands::CommandLine;
use pingr_common::{config::Config, input, network::host::Host};
use pingr_core::{
    network,
    prober::IcmpProber,
    scheduler::{ProbeScheduler, ReachableStream},
};
use terminal::{logging, print};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init(commands.verbose, commands.quiet);

    let cfg: Config = commands.to_config();
    cfg.validate()?;

    let hosts: Vec<Host> = input::read_hosts(io::stdin().lock()).context("reading standard input")?;

    if !network::has_raw_socket_privilege() {
        warn!("Not running as root: ICMP probes need raw sockets and may all fail");
    }
    info!(hosts = hosts.len(), "Starting probes");

    let prober = Arc::new(IcmpProber::new(cfg.probe));
    let scheduler = ProbeScheduler::from_config(prober, &cfg);

    let start_time: Instant = Instant::now();
    let mut stream: ReachableStream = scheduler.run(hosts);
    while let Some(host) = stream.recv().await {
        print::reachable(&mut io::stdout(), &host).context("writing standard output")?;
    }

    let summary = stream.summary();
    if summary.errors > 0 {
        info!(
            errors = summary.errors,
            construction = summary.construction_errors,
            transport = summary.transport_errors,
            task = summary.task_failures,
            "Some hosts could not be probed; rerun with -vv for details"
        );
    }
    if commands.summary {
        print::summary(&summary, start_time.elapsed());
    }
    Ok(())
}
