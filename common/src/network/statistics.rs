use std::net::IpAddr;
use std::time::Duration;

/// Counters collected over one probe session.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeStatistics {
    /// The address the host resolved to.
    pub addr: IpAddr,
    pub packets_sent: usize,
    pub packets_recv: usize,
    /// Round-trip time of every reply, in arrival order.
    pub rtts: Vec<Duration>,
}

impl ProbeStatistics {
    pub fn new(addr: IpAddr) -> Self {
        Self {
            addr,
            packets_sent: 0,
            packets_recv: 0,
            rtts: Vec::new(),
        }
    }

    pub fn record_reply(&mut self, rtt: Duration) {
        self.packets_recv += 1;
        self.rtts.push(rtt);
    }

    /// Percentage of sent requests that were never answered.
    pub fn packet_loss(&self) -> f64 {
        if self.packets_sent == 0 {
            return 0.0;
        }
        let lost = self.packets_sent.saturating_sub(self.packets_recv);
        lost as f64 / self.packets_sent as f64 * 100.0
    }

    pub fn min_rtt(&self) -> Option<Duration> {
        self.rtts.iter().min().copied()
    }

    pub fn max_rtt(&self) -> Option<Duration> {
        self.rtts.iter().max().copied()
    }

    pub fn avg_rtt(&self) -> Option<Duration> {
        if self.rtts.is_empty() {
            return None;
        }
        let total: Duration = self.rtts.iter().sum();
        Some(total / self.rtts.len() as u32)
    }
}
