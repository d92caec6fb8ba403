//! The probe protocol: decide whether one host answers ICMP echo.
//!
//! High-level code depends on the [`Prober`] trait only, so the scheduler can
//! be driven by fakes in tests and by [`IcmpProber`] in production.

use async_trait::async_trait;
use pingr_common::network::{host::Host, outcome::ProbeOutcome};

mod icmp;
mod session;

pub use icmp::IcmpProber;
pub use session::PingSession;

#[async_trait]
pub trait Prober: Send + Sync {
    /// Probes one host. Never panics on bad input; every failure is an outcome.
    async fn probe(&self, host: &Host) -> ProbeOutcome;
}
