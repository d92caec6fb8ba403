//! # Probe Outcomes
//!
//! Every probe task ends in exactly one [`ProbeOutcome`]. Timeouts are not an
//! error: a host that never answered is [`ProbeOutcome::Unreachable`]. Only
//! failures that prevented the probe from being carried out at all end up as
//! [`ProbeOutcome::Error`].

use std::io;

use thiserror::Error;

use crate::network::host::Host;
use crate::network::statistics::ProbeStatistics;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to resolve {host}: {source}")]
    Resolution {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no address found for {host}")]
    NoAddress { host: String },

    /// Raw ICMP sockets need root or `CAP_NET_RAW`.
    #[error("permission denied opening raw ICMP socket (root or CAP_NET_RAW required): {0}")]
    Permission(#[source] io::Error),

    #[error("ICMP transport error: {0}")]
    Transport(#[source] io::Error),

    #[error("failed to build echo request: {0}")]
    Packet(String),

    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

/// Where a probe failed; the scheduler summary counts each kind separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeErrorKind {
    /// The session could not be built; no packet left the machine.
    Construction,
    /// Opening the socket, sending or receiving failed.
    Transport,
    Task,
}

impl ProbeError {
    /// Maps a socket-level error, separating privilege failures from the rest.
    pub fn from_socket(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::Permission(err),
            _ => Self::Transport(err),
        }
    }

    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            Self::Resolution { .. } | Self::NoAddress { .. } | Self::Packet(_) => {
                ProbeErrorKind::Construction
            }
            Self::Permission(_) | Self::Transport(_) => ProbeErrorKind::Transport,
            Self::TaskFailed(_) => ProbeErrorKind::Task,
        }
    }
}

#[derive(Debug)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable,
    Error(ProbeError),
}

impl ProbeOutcome {
    /// At least one reply means reachable, regardless of how many were lost.
    pub fn from_statistics(stats: &ProbeStatistics) -> Self {
        if stats.packets_recv > 0 {
            Self::Reachable
        } else {
            Self::Unreachable
        }
    }

    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

impl From<Result<ProbeStatistics, ProbeError>> for ProbeOutcome {
    fn from(result: Result<ProbeStatistics, ProbeError>) -> Self {
        match result {
            Ok(stats) => Self::from_statistics(&stats),
            Err(e) => Self::Error(e),
        }
    }
}

/// One finished task: the host it was bound to and what happened.
#[derive(Debug)]
pub struct ProbeReport {
    pub host: Host,
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn new(host: Host, outcome: ProbeOutcome) -> Self {
        Self { host, outcome }
    }
}
