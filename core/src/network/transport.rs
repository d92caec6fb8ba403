use std::{
    io,
    net::{IpAddr, SocketAddr},
};

use pingr_protocols::icmp::IcmpVersion;
use pnet::packet::ipv4::Ipv4Packet;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

const RECV_BUFFER_SIZE: usize = 4096;

/// A raw ICMP socket for one address family, driven by the Tokio reactor.
///
/// Every open transport sees every ICMP message the host receives, so callers
/// must filter replies themselves. Waiting for a packet parks the task, never
/// a thread.
pub struct IcmpTransport {
    version: IcmpVersion,
    socket: UdpSocket,
    buffer: Vec<u8>,
}

impl IcmpTransport {
    /// Fails with `PermissionDenied` without raw socket privileges.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(version: IcmpVersion) -> io::Result<Self> {
        let (domain, protocol) = match version {
            IcmpVersion::V4 => (Domain::IPV4, Protocol::ICMPV4),
            IcmpVersion::V6 => (Domain::IPV6, Protocol::ICMPV6),
        };
        let socket: Socket = Socket::new(domain, Type::RAW, Some(protocol))?;
        socket.set_nonblocking(true)?;
        // Raw sockets are datagram sockets; the UDP wrapper only supplies readiness.
        let socket: UdpSocket = UdpSocket::from_std(socket.into())?;
        Ok(Self {
            version,
            socket,
            buffer: vec![0; RECV_BUFFER_SIZE],
        })
    }

    pub async fn send_to(&self, bytes: &[u8], destination: IpAddr) -> io::Result<()> {
        self.socket
            .send_to(bytes, SocketAddr::new(destination, 0))
            .await?;
        Ok(())
    }

    /// Waits for the next ICMP message, IP header stripped.
    ///
    /// Cancel safe: dropping the future loses no datagram.
    pub async fn recv(&mut self) -> io::Result<(Vec<u8>, IpAddr)> {
        loop {
            let (len, source) = self.socket.recv_from(&mut self.buffer).await?;
            if let Some(message) = icmp_message(self.version, &self.buffer[..len]) {
                return Ok((message, source.ip()));
            }
        }
    }
}

/// IPv4 raw sockets deliver the IP header along with the message, IPv6 ones
/// do not. `None` for a datagram too short to hold its own header.
fn icmp_message(version: IcmpVersion, datagram: &[u8]) -> Option<Vec<u8>> {
    match version {
        IcmpVersion::V4 => {
            let packet = Ipv4Packet::new(datagram)?;
            let header_len: usize = usize::from(packet.get_header_length()) * 4;
            datagram.get(header_len..).map(<[u8]>::to_vec)
        }
        IcmpVersion::V6 => Some(datagram.to_vec()),
    }
}
