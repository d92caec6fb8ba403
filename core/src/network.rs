pub mod resolver;
pub mod transport;

/// Raw ICMP sockets need root (or `CAP_NET_RAW`, which this cannot detect).
pub fn has_raw_socket_privilege() -> bool {
    is_root::is_root()
}
