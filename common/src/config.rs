use std::time::Duration;

use anyhow::ensure;

/// Echo requests sent per host.
pub const DEFAULT_COUNT: usize = 3;
/// Budget for all attempts against one host.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between two echo requests of the same session.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Echo payload length; the first 8 bytes carry the session tracker.
pub const DEFAULT_PAYLOAD_SIZE: usize = 16;

/// Settings for a single probe session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    pub count: usize,
    /// Covers every attempt, not each one individually.
    pub timeout: Duration,
    pub interval: Duration,
    pub payload_size: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub probe: ProbeConfig,
    /// Caps how many probes run at once.
    ///
    /// `None` launches every probe immediately.
    pub max_concurrency: Option<usize>,
    /// Wall-clock budget for the whole batch, measured from dispatch.
    ///
    /// `None` leaves each probe bounded only by its own timeout.
    pub deadline: Option<Duration>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.probe.count > 0, "echo request count must be at least 1");
        ensure!(!self.probe.timeout.is_zero(), "probe timeout must be non-zero");
        ensure!(
            self.probe.payload_size >= 8,
            "payload must hold the 8 byte session tracker"
        );
        if let Some(limit) = self.max_concurrency {
            ensure!(limit > 0, "max concurrency must be at least 1");
        }
        Ok(())
    }
}
