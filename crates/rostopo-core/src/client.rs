//! Registry and peer client contracts
//!
//! The inspection runtime never speaks a wire protocol itself. It pulls
//! snapshots from a registry and talks to peers through these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{PeerError, RegistryError, Value};

/// A topic or service name with the nodes attached to it
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameNodes {
    pub name: String,
    pub nodes: Vec<String>,
}

impl NameNodes {
    pub fn new<I, S>(name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Registry system-state snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    pub published: Vec<NameNodes>,
    pub subscribed: Vec<NameNodes>,
    pub services: Vec<NameNodes>,
}

/// A topic name with its registered message type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicType {
    pub name: String,
    pub type_name: String,
}

impl TopicType {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Central registry
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn get_system_state(&self) -> Result<SystemState, RegistryError>;

    async fn get_topic_types(&self) -> Result<Vec<TopicType>, RegistryError>;

    /// URL of a node's peer endpoint
    async fn lookup_node(&self, name: &str) -> Result<String, RegistryError>;

    /// URL of a service endpoint
    async fn lookup_service(&self, name: &str) -> Result<String, RegistryError>;
}

/// A peer reached directly at its `host:port`
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn get_pid(&self) -> Result<i64, PeerError>;

    async fn shutdown(&self, reason: &str) -> Result<(), PeerError>;

    /// One untyped tuple per connection held by the peer
    async fn get_bus_info(&self) -> Result<Vec<Vec<Value>>, PeerError>;
}

/// Opens short-lived peer clients
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Open a client for the peer at `address`, presenting `caller_id`
    async fn connect(&self, address: &str, caller_id: &str)
        -> Result<Box<dyn PeerClient>, PeerError>;
}
