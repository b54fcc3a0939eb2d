//! rostopo Test Harness - Simulated graph for inspector validation
//!
//! This crate provides:
//! - An in-memory registry with per-call fault injection
//! - A simulated peer network with latency, failures and shutdown tracking
//! - Ready-made graph scenarios

pub mod scenario;
pub mod simulator;

pub use scenario::*;
pub use simulator::*;
