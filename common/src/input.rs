use std::io::{self, BufRead};

use crate::network::host::Host;

/// Reads one host per line until end of stream.
///
/// Lines are kept as they are, blank ones included. Line terminators (`\n` or
/// `\r\n`) are stripped. The first read error aborts the whole read.
pub fn read_hosts<R: BufRead>(reader: R) -> io::Result<Vec<Host>> {
    reader.lines().map(|line| line.map(Host::from)).collect()
}
