//! Fan-out/fan-in probe scheduling.
//!
//! Every host gets its own task. Tasks report into one unbounded channel in
//! the order they finish, so the output carries no relation to the input
//! order. Each task owns a sender; a supervisor owns one more and drops it only
//! after joining every task, which closes the channel exactly once and never
//! before the last report has been written.
//!
//! By default there is no cap on concurrent probes and no batch deadline: a run
//! takes as long as its slowest probe. Both can be opted into through
//! [`ProbeScheduler::with_max_concurrency`] and [`ProbeScheduler::with_deadline`].

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use pingr_common::{
    config::Config,
    network::{
        host::Host,
        outcome::{ProbeError, ProbeErrorKind, ProbeOutcome, ProbeReport},
    },
};
use tokio::{
    sync::{Semaphore, mpsc},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, trace};

use crate::prober::Prober;

/// Counter snapshot of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub dispatched: usize,
    pub reachable: usize,
    pub unreachable: usize,
    /// All errored probes; the three fields below split them by kind.
    pub errors: usize,
    pub construction_errors: usize,
    pub transport_errors: usize,
    pub task_failures: usize,
}

impl SchedulerSummary {
    pub fn completed(&self) -> usize {
        self.reachable + self.unreachable + self.errors
    }
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicUsize,
    reachable: AtomicUsize,
    unreachable: AtomicUsize,
    errors: AtomicUsize,
    construction_errors: AtomicUsize,
    transport_errors: AtomicUsize,
    task_failures: AtomicUsize,
}

impl Counters {
    fn record(&self, outcome: &ProbeOutcome) {
        let counter: &AtomicUsize = match outcome {
            ProbeOutcome::Reachable => &self.reachable,
            ProbeOutcome::Unreachable => &self.unreachable,
            ProbeOutcome::Error(e) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
                match e.kind() {
                    ProbeErrorKind::Construction => &self.construction_errors,
                    ProbeErrorKind::Transport => &self.transport_errors,
                    ProbeErrorKind::Task => &self.task_failures,
                }
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SchedulerSummary {
        SchedulerSummary {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            reachable: self.reachable.load(Ordering::Relaxed),
            unreachable: self.unreachable.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            construction_errors: self.construction_errors.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            task_failures: self.task_failures.load(Ordering::Relaxed),
        }
    }
}

/// Every outcome of a run, in completion order.
#[derive(Debug)]
pub struct ProbeStream {
    rx: mpsc::UnboundedReceiver<ProbeReport>,
    counters: Arc<Counters>,
}

impl ProbeStream {
    /// `None` once every dispatched task has reported.
    pub async fn recv(&mut self) -> Option<ProbeReport> {
        self.rx.recv().await
    }

    /// Final once [`recv`](Self::recv) has returned `None`.
    pub fn summary(&self) -> SchedulerSummary {
        self.counters.snapshot()
    }

    pub fn reachable(self) -> ReachableStream {
        ReachableStream { inner: self }
    }
}

/// Reachable hosts only. Unreachable and errored hosts are dropped here, in
/// the collector, and only show up in the summary.
#[derive(Debug)]
pub struct ReachableStream {
    inner: ProbeStream,
}

impl ReachableStream {
    pub async fn recv(&mut self) -> Option<Host> {
        while let Some(report) = self.inner.recv().await {
            match report.outcome {
                ProbeOutcome::Reachable => return Some(report.host),
                ProbeOutcome::Unreachable => {
                    trace!(host = %report.host, "Host did not answer");
                }
                ProbeOutcome::Error(e) => {
                    debug!(host = %report.host, error = %e, "Probe failed, host omitted");
                }
            }
        }
        None
    }

    pub fn summary(&self) -> SchedulerSummary {
        self.inner.summary()
    }
}

pub struct ProbeScheduler {
    prober: Arc<dyn Prober>,
    max_concurrency: Option<usize>,
    deadline: Option<Duration>,
}

impl ProbeScheduler {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            max_concurrency: None,
            deadline: None,
        }
    }

    pub fn from_config(prober: Arc<dyn Prober>, cfg: &Config) -> Self {
        Self {
            prober,
            max_concurrency: cfg.max_concurrency,
            deadline: cfg.deadline,
        }
    }

    /// Gates probes behind a semaphore; tasks are still spawned up front.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }

    /// A task still running when the deadline passes reports
    /// [`ProbeOutcome::Unreachable`].
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Dispatches one task per host and returns the reachable ones.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run(&self, hosts: Vec<Host>) -> ReachableStream {
        self.run_outcomes(hosts).reachable()
    }

    /// Dispatches one task per host and returns every outcome.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run_outcomes(&self, hosts: Vec<Host>) -> ProbeStream {
        let (tx, rx) = mpsc::unbounded_channel::<ProbeReport>();
        let counters: Arc<Counters> = Arc::new(Counters::default());
        let semaphore: Option<Arc<Semaphore>> =
            self.max_concurrency.map(|limit| Arc::new(Semaphore::new(limit)));
        let deadline: Option<Instant> = self.deadline.map(|d| Instant::now() + d);

        let mut handles: Vec<(Host, JoinHandle<()>)> = Vec::with_capacity(hosts.len());
        for host in hosts {
            counters.dispatched.fetch_add(1, Ordering::Relaxed);
            let task = ProbeTask {
                prober: self.prober.clone(),
                host: host.clone(),
                semaphore: semaphore.clone(),
                deadline,
            };
            let tx = tx.clone();
            let counters_ref = counters.clone();

            let handle = tokio::spawn(async move {
                let report: ProbeReport = task.run().await;
                counters_ref.record(&report.outcome);
                // The receiver may be gone; the task still ran to completion.
                let _ = tx.send(report);
            });
            handles.push((host, handle));
        }
        debug!(tasks = handles.len(), "Probe tasks dispatched");

        let counters_ref = counters.clone();
        tokio::spawn(async move {
            for (host, handle) in handles {
                if let Err(e) = handle.await {
                    error!(host = %host, error = %e, "Probe task died");
                    let outcome = ProbeOutcome::Error(ProbeError::TaskFailed(e.to_string()));
                    counters_ref.record(&outcome);
                    let _ = tx.send(ProbeReport::new(host, outcome));
                }
            }
            trace!("All probe tasks joined");
        });

        ProbeStream { rx, counters }
    }

    /// Drains a run and returns the reachable hosts with the final summary.
    pub async fn collect(&self, hosts: Vec<Host>) -> (Vec<Host>, SchedulerSummary) {
        let mut stream: ReachableStream = self.run(hosts);
        let mut reachable: Vec<Host> = Vec::new();
        while let Some(host) = stream.recv().await {
            reachable.push(host);
        }
        (reachable, stream.summary())
    }
}

struct ProbeTask {
    prober: Arc<dyn Prober>,
    host: Host,
    semaphore: Option<Arc<Semaphore>>,
    deadline: Option<Instant>,
}

impl ProbeTask {
    async fn run(self) -> ProbeReport {
        let work = async {
            // The semaphore is never closed, so acquiring cannot fail.
            let _permit = match self.semaphore.as_deref() {
                Some(semaphore) => semaphore.acquire().await.ok(),
                None => None,
            };
            self.prober.probe(&self.host).await
        };

        let outcome: ProbeOutcome = match self.deadline {
            Some(at) => match tokio::time::timeout_at(at, work).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!(host = %self.host, "Batch deadline reached before probe finished");
                    ProbeOutcome::Unreachable
                }
            },
            None => work.await,
        };

        ProbeReport::new(self.host, outcome)
    }
}
