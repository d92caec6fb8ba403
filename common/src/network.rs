pub mod host;
pub mod outcome;
pub mod statistics;
