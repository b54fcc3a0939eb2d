//! rostopo Runtime - Live graph inspection
//!
//! This crate implements the query and action surface:
//! - Node, topic and service views aggregated from registry snapshots
//! - Machine enumeration from resolved node addresses
//! - Ping, kill and connection listing against individual peers
//!
//! Every call pulls a fresh snapshot. Nothing is cached between calls.

pub mod config;
pub mod fanout;
pub mod inspector;
pub mod logging;
mod peer;
mod topology;

pub use config::*;
pub use fanout::try_join_bounded;
pub use inspector::*;
pub use logging::*;
pub use peer::PingReport;
