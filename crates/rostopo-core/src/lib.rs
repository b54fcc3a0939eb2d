//! rostopo Core - Graph records and collaborator contracts
//!
//! This crate defines the types shared by the inspection runtime:
//! - Graph records (InfoNode, InfoTopic, InfoService, InfoConnection)
//! - Untyped peer values and the bus-info connection decoder
//! - Registry URL to `host:port` address resolution
//! - Registry and peer client contracts
//! - Error taxonomy

pub mod address;
pub mod client;
pub mod connection;
pub mod error;
pub mod graph;
pub mod value;

pub use address::*;
pub use client::*;
pub use connection::*;
pub use error::*;
pub use graph::*;
pub use value::*;
