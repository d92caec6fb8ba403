use std::net::IpAddr;

use anyhow::{Context, ensure};
use pnet::packet::Packet;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::icmpv6::{self, Icmpv6Code, Icmpv6Packet, Icmpv6Types};

/// Type, code, checksum, identifier and sequence number.
pub const ICMP_ECHO_HDR_LEN: usize = 8;
pub const TRACKER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpVersion {
    V4,
    V6,
}

impl IcmpVersion {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
    /// Written at the start of the payload so replies can be told apart from
    /// those of other sessions that happen to share the identifier.
    pub tracker: u64,
    pub payload_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub identifier: u16,
    pub sequence: u16,
    /// `None` when the echoed payload is too short to carry one.
    pub tracker: Option<u64>,
}

pub fn create_echo_request(version: IcmpVersion, request: &EchoRequest) -> anyhow::Result<Vec<u8>> {
    let payload: Vec<u8> = create_payload(request)?;
    match version {
        IcmpVersion::V4 => create_echo_request_v4(request, &payload),
        IcmpVersion::V6 => create_echo_request_v6(request, &payload),
    }
}

/// Parses an ICMP message with the IP header already stripped.
///
/// Anything other than an echo reply is an error, which callers treat as
/// "not ours" and skip.
pub fn parse_echo_reply(version: IcmpVersion, bytes: &[u8]) -> anyhow::Result<EchoReply> {
    match version {
        IcmpVersion::V4 => parse_echo_reply_v4(bytes),
        IcmpVersion::V6 => parse_echo_reply_v6(bytes),
    }
}

fn create_payload(request: &EchoRequest) -> anyhow::Result<Vec<u8>> {
    ensure!(
        request.payload_size >= TRACKER_LEN,
        "payload of {} bytes cannot hold the tracker",
        request.payload_size
    );
    let mut payload: Vec<u8> = vec![0u8; request.payload_size];
    payload[..TRACKER_LEN].copy_from_slice(&request.tracker.to_be_bytes());
    Ok(payload)
}

fn read_tracker(payload: &[u8]) -> Option<u64> {
    let bytes: [u8; TRACKER_LEN] = payload.get(..TRACKER_LEN)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

fn create_echo_request_v4(request: &EchoRequest, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + payload.len()];
    let mut echo = icmp::echo_request::MutableEchoRequestPacket::new(&mut buffer)
        .context("failed to create echo request packet")?;

    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(request.identifier);
    echo.set_sequence_number(request.sequence);
    echo.set_payload(payload);

    echo.set_checksum(0);
    let echo_imm = echo.to_immutable();
    let icmp_pkt = IcmpPacket::new(echo_imm.packet()).context("failed to create ICMP packet")?;
    let csm = icmp::checksum(&icmp_pkt);
    echo.set_checksum(csm);
    Ok(buffer)
}

// The kernel fills in the ICMPv6 checksum on raw sockets since it needs the
// source address, which is not known here.
fn create_echo_request_v6(request: &EchoRequest, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + payload.len()];
    let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut buffer)
        .context("failed to create echo request packet")?;

    echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
    echo.set_icmpv6_code(Icmpv6Code(0));
    echo.set_identifier(request.identifier);
    echo.set_sequence_number(request.sequence);
    echo.set_payload(payload);
    echo.set_checksum(0);
    Ok(buffer)
}

fn parse_echo_reply_v4(bytes: &[u8]) -> anyhow::Result<EchoReply> {
    let icmp_pkt = IcmpPacket::new(bytes).context("truncated or invalid ICMP packet")?;
    let icmp_type = icmp_pkt.get_icmp_type();
    ensure!(icmp_type == IcmpTypes::EchoReply, "not an echo reply: {icmp_type:?}");

    let reply = icmp::echo_reply::EchoReplyPacket::new(bytes).context("truncated echo reply")?;
    Ok(EchoReply {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
        tracker: read_tracker(reply.payload()),
    })
}

fn parse_echo_reply_v6(bytes: &[u8]) -> anyhow::Result<EchoReply> {
    let icmp_pkt = Icmpv6Packet::new(bytes).context("truncated or invalid ICMPv6 packet")?;
    let icmp_type = icmp_pkt.get_icmpv6_type();
    ensure!(icmp_type == Icmpv6Types::EchoReply, "not an echo reply: {icmp_type:?}");

    let reply = icmpv6::echo_reply::EchoReplyPacket::new(bytes).context("truncated echo reply")?;
    Ok(EchoReply {
        identifier: reply.get_identifier(),
        sequence: reply.get_sequence_number(),
        tracker: read_tracker(reply.payload()),
    })
}
