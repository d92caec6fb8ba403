//! # pingr core
//!
//! The probing engine.
//!
//! * **[`prober`]**: the [`prober::Prober`] abstraction and its ICMP echo
//!   implementation. This is the only place that touches the network.
//! * **[`scheduler`]**: fans hosts out to one probe task each and fans the
//!   outcomes back into a single stream.
//! * **[`network`]**: raw socket plumbing and name resolution used by the prober.

pub mod network;
pub mod prober;
pub mod scheduler;
