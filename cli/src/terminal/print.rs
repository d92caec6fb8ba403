use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use pingr_common::network::host::Host;
use pingr_core::scheduler::SchedulerSummary;

/// One reachable host per line, nothing else on stdout.
pub fn reachable<W: Write>(out: &mut W, host: &Host) -> io::Result<()> {
    writeln!(out, "{host}")?;
    out.flush()
}

pub fn summary_line(summary: &SchedulerSummary, total_time: Duration) -> String {
    let reachable: ColoredString = format!("{} reachable", summary.reachable).bold().green();
    let unreachable: ColoredString = format!("{} unreachable", summary.unreachable).yellow();
    let errors: ColoredString = match summary.errors {
        0 => format!("{} errors", summary.errors).normal(),
        n => format!(
            "{n} errors ({} construction, {} transport, {} task)",
            summary.construction_errors, summary.transport_errors, summary.task_failures
        )
        .bold()
        .red(),
    };
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    format!(
        "Probed {} hosts in {}: {}, {}, {}",
        summary.dispatched, total_time, reachable, unreachable, errors
    )
}

pub fn summary(summary: &SchedulerSummary, total_time: Duration) {
    eprintln!("{}", summary_line(summary, total_time));
}
