//! # pingr common
//!
//! Domain types shared by every crate in the workspace.
//!
//! * **[`network`]**: hosts, probe outcomes, probe errors and statistics.
//! * **[`config`]**: probe and scheduler settings.
//! * **[`input`]**: reading the host list.

pub mod config;
pub mod input;
pub mod network;
