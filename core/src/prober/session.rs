//! An ICMP echo session against one resolved address.
//!
//! Requests go out one per `interval`, up to `count`, and the session ends
//! when every request has been answered or the overall `timeout` runs out,
//! whichever comes first. Building the session opens a raw socket, which
//! requires root or `CAP_NET_RAW`.

use std::{collections::HashMap, net::IpAddr, time::Duration};

use pingr_common::{
    config::ProbeConfig,
    network::{outcome::ProbeError, statistics::ProbeStatistics},
};
use pingr_protocols::icmp::{self, EchoReply, EchoRequest, IcmpVersion};
use tokio::time::{self, Instant};
use tracing::trace;

use crate::network::transport::IcmpTransport;

pub struct PingSession {
    addr: IpAddr,
    version: IcmpVersion,
    cfg: ProbeConfig,
    matcher: ReplyMatcher,
    transport: IcmpTransport,
    in_flight: HashMap<u16, Instant>,
}

impl PingSession {
    /// Must be called from within a Tokio runtime.
    pub fn new(addr: IpAddr, cfg: ProbeConfig) -> Result<Self, ProbeError> {
        let version = IcmpVersion::of(&addr);
        let transport = IcmpTransport::open(version).map_err(ProbeError::from_socket)?;
        Ok(Self {
            addr,
            version,
            cfg,
            matcher: ReplyMatcher {
                addr,
                identifier: rand::random(),
                tracker: rand::random(),
            },
            transport,
            in_flight: HashMap::new(),
        })
    }

    pub async fn run(mut self) -> Result<ProbeStatistics, ProbeError> {
        let start: Instant = Instant::now();
        let deadline: Instant = start + self.cfg.timeout;
        let mut stats = ProbeStatistics::new(self.addr);
        let mut next_send: Instant = start;

        loop {
            let now: Instant = Instant::now();
            if now >= deadline {
                break;
            }

            if stats.packets_sent < self.cfg.count && now >= next_send {
                self.send_echo(stats.packets_sent as u16).await?;
                stats.packets_sent += 1;
                next_send = now + self.cfg.interval;
            }

            if stats.packets_sent == self.cfg.count && self.in_flight.is_empty() {
                break;
            }

            let wake: Instant = if stats.packets_sent < self.cfg.count {
                next_send.min(deadline)
            } else {
                deadline
            };

            // Elapsed means it is time to send again or to give up.
            if let Ok(received) = time::timeout_at(wake, self.transport.recv()).await {
                let (bytes, source) = received.map_err(ProbeError::from_socket)?;
                self.process_packet(&bytes, source, &mut stats);
            }
        }

        trace!(
            addr = %self.addr,
            sent = stats.packets_sent,
            recv = stats.packets_recv,
            "echo session finished"
        );
        Ok(stats)
    }

    async fn send_echo(&mut self, sequence: u16) -> Result<(), ProbeError> {
        let request = EchoRequest {
            identifier: self.matcher.identifier,
            sequence,
            tracker: self.matcher.tracker,
            payload_size: self.cfg.payload_size,
        };
        let bytes: Vec<u8> = icmp::create_echo_request(self.version, &request)
            .map_err(|e| ProbeError::Packet(e.to_string()))?;

        self.transport
            .send_to(&bytes, self.addr)
            .await
            .map_err(ProbeError::from_socket)?;
        self.in_flight.insert(sequence, Instant::now());
        Ok(())
    }

    fn process_packet(&mut self, bytes: &[u8], source: IpAddr, stats: &mut ProbeStatistics) {
        let Ok(reply) = icmp::parse_echo_reply(self.version, bytes) else {
            return;
        };
        if let Some(rtt) = self
            .matcher
            .accept(source, &reply, &mut self.in_flight, Instant::now())
        {
            stats.record_reply(rtt);
        }
    }
}

/// Tells this session's replies apart from everything else a raw socket sees.
#[derive(Debug, Clone, Copy)]
struct ReplyMatcher {
    addr: IpAddr,
    identifier: u16,
    tracker: u64,
}

impl ReplyMatcher {
    /// Round-trip time of a reply to a request still in flight.
    ///
    /// The request is taken out of `in_flight`, so a duplicate reply finds
    /// nothing and is not counted twice.
    fn accept(
        &self,
        source: IpAddr,
        reply: &EchoReply,
        in_flight: &mut HashMap<u16, Instant>,
        now: Instant,
    ) -> Option<Duration> {
        if source != self.addr
            || reply.identifier != self.identifier
            || reply.tracker != Some(self.tracker)
        {
            return None;
        }
        in_flight
            .remove(&reply.sequence)
            .map(|sent_at| now.saturating_duration_since(sent_at))
    }
}
