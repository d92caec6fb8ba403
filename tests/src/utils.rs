use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pingr_common::network::{
    host::Host,
    outcome::{ProbeError, ProbeOutcome},
};
use pingr_core::prober::Prober;
use tokio::sync::Barrier;

/// What a scripted host should report.
#[derive(Debug, Clone, Copy)]
pub enum Fake {
    /// At least one reply received.
    Reachable,
    /// Zero replies, no error.
    Unreachable,
    ResolutionFailure,
    PermissionDenied,
}

impl Fake {
    fn outcome(self, host: &Host) -> ProbeOutcome {
        match self {
            Fake::Reachable => ProbeOutcome::Reachable,
            Fake::Unreachable => ProbeOutcome::Unreachable,
            Fake::ResolutionFailure => ProbeOutcome::Error(ProbeError::Resolution {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
            }),
            Fake::PermissionDenied => ProbeOutcome::Error(ProbeError::Permission(
                io::Error::from(io::ErrorKind::PermissionDenied),
            )),
        }
    }
}

/// Deterministic prober: each host answers as scripted, unknown hosts are
/// unreachable. Counts every call.
#[derive(Default)]
pub struct ScriptedProber {
    script: HashMap<String, (Fake, Duration)>,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(self, name: &str, fake: Fake) -> Self {
        self.host_after(name, fake, Duration::ZERO)
    }

    pub fn host_after(mut self, name: &str, fake: Fake, delay: Duration) -> Self {
        self.script.insert(name.to_string(), (fake, delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, host: &Host) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (fake, delay) = self
            .script
            .get(host.as_str())
            .copied()
            .unwrap_or((Fake::Unreachable, Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        fake.outcome(host)
    }
}

/// Tracks how many probes are in flight at once.
pub struct GaugeProber {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl GaugeProber {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for GaugeProber {
    async fn probe(&self, _host: &Host) -> ProbeOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ProbeOutcome::Reachable
    }
}

/// Every probe waits until `n` probes are in flight together, so a run only
/// finishes if nothing caps concurrency below `n`.
pub struct RendezvousProber {
    barrier: Barrier,
}

impl RendezvousProber {
    pub fn new(n: usize) -> Self {
        Self {
            barrier: Barrier::new(n),
        }
    }
}

#[async_trait]
impl Prober for RendezvousProber {
    async fn probe(&self, _host: &Host) -> ProbeOutcome {
        self.barrier.wait().await;
        ProbeOutcome::Reachable
    }
}

/// Panics on the host named `boom`, reachable otherwise.
pub struct PanickingProber;

#[async_trait]
impl Prober for PanickingProber {
    async fn probe(&self, host: &Host) -> ProbeOutcome {
        if host.as_str() == "boom" {
            panic!("prober exploded");
        }
        ProbeOutcome::Reachable
    }
}

pub fn hosts(names: &[&str]) -> Vec<Host> {
    names.iter().map(|name| Host::from(*name)).collect()
}

pub fn host_set(hosts: impl IntoIterator<Item = Host>) -> HashSet<Host> {
    hosts.into_iter().collect()
}

pub fn shared<P: Prober + 'static>(prober: P) -> Arc<P> {
    Arc::new(prober)
}
