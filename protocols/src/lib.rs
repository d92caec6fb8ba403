//! Wire formats spoken by the prober.
//!
//! Only ICMP echo for now; packets are built and parsed with `pnet` so the
//! core never touches raw offsets.

pub mod icmp;
