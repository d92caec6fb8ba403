use async_trait::async_trait;
use pingr_common::{
    config::ProbeConfig,
    network::{
        host::Host,
        outcome::{ProbeError, ProbeOutcome},
        statistics::ProbeStatistics,
    },
};
use tracing::debug;

use super::{Prober, session::PingSession};
use crate::network::resolver;

/// ICMP echo prober.
///
/// Each probe resolves the host, opens its own raw socket and runs a
/// [`PingSession`] on the calling task. Without raw socket privileges every
/// probe ends in [`ProbeError::Permission`].
#[derive(Debug, Clone, Default)]
pub struct IcmpProber {
    cfg: ProbeConfig,
}

impl IcmpProber {
    pub fn new(cfg: ProbeConfig) -> Self {
        Self { cfg }
    }

    /// Runs a full session and returns its counters.
    pub async fn ping(&self, host: &Host) -> Result<ProbeStatistics, ProbeError> {
        let addr = resolver::resolve_host(host.as_str(), self.cfg.timeout).await?;
        PingSession::new(addr, self.cfg)?.run().await
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, host: &Host) -> ProbeOutcome {
        let result = self.ping(host).await;
        match &result {
            Ok(stats) => debug!(
                host = %host,
                addr = %stats.addr,
                sent = stats.packets_sent,
                recv = stats.packets_recv,
                loss = stats.packet_loss(),
                min_rtt = ?stats.min_rtt(),
                avg_rtt = ?stats.avg_rtt(),
                max_rtt = ?stats.max_rtt(),
                "Echo probe finished"
            ),
            Err(e) => debug!(host = %host, error = %e, "Echo probe failed"),
        }
        result.into()
    }
}
