use std::{
    io,
    net::{IpAddr, SocketAddr, ToSocketAddrs},
    time::Duration,
};

use pingr_common::network::outcome::ProbeError;
use tokio::{sync::oneshot, time::timeout};

/// Turns a host string into the address to probe.
///
/// IP literals are used as-is; anything else goes through the system resolver
/// and the first address wins. The lookup gets a budget of its own, equal to
/// the probe timeout, on top of the echo session's. The budget starts once
/// the lookup is running, so time spent queued for a blocking thread does not
/// count against it.
pub async fn resolve_host(host: &str, budget: Duration) -> Result<IpAddr, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    if host.is_empty() {
        return Err(ProbeError::NoAddress {
            host: host.to_string(),
        });
    }

    let (started_tx, started_rx) = oneshot::channel::<()>();
    let target: String = format!("{host}:0");
    let lookup = tokio::task::spawn_blocking(move || {
        let _ = started_tx.send(());
        target
            .to_socket_addrs()
            .map(|addrs| addrs.collect::<Vec<SocketAddr>>())
    });
    // Errs only if the lookup never ran, which the join below reports.
    let _ = started_rx.await;

    let joined = timeout(budget, lookup)
        .await
        .map_err(|_| ProbeError::Resolution {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::TimedOut, "name resolution timed out"),
        })?;

    let addrs: Vec<SocketAddr> = joined
        .map_err(|e| ProbeError::TaskFailed(e.to_string()))?
        .map_err(|source| ProbeError::Resolution {
            host: host.to_string(),
            source,
        })?;

    addrs
        .first()
        .map(|addr| addr.ip())
        .ok_or_else(|| ProbeError::NoAddress {
            host: host.to_string(),
        })
}
