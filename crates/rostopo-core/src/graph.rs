//! Graph records
//!
//! Value types assembled fresh on every query. No record refers back to
//! another; nodes, topics and services reference each other by name only.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Nodes keyed by node name
pub type NodeMap = HashMap<String, InfoNode>;

/// Topics keyed by topic name
pub type TopicMap = HashMap<String, InfoTopic>;

/// Services keyed by service name
pub type ServiceMap = HashMap<String, InfoService>;

/// Distinct hosts running at least one node
pub type MachineSet = HashSet<String>;

/// A node as seen by the registry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoNode {
    pub published_topics: HashSet<String>,
    pub subscribed_topics: HashSet<String>,
    pub provided_services: HashSet<String>,
    /// `host:port` of the node's peer endpoint
    pub address: String,
}

impl InfoNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the node takes part in no topic and provides no service
    pub fn is_idle(&self) -> bool {
        self.published_topics.is_empty()
            && self.subscribed_topics.is_empty()
            && self.provided_services.is_empty()
    }
}

/// A topic with a registered type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoTopic {
    /// Declared message type, e.g. `sensor_msgs/LaserScan`
    pub type_name: String,
    pub publishers: HashSet<String>,
    pub subscribers: HashSet<String>,
}

impl InfoTopic {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            publishers: HashSet::new(),
            subscribers: HashSet::new(),
        }
    }
}

/// A service and the endpoint it is served on
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoService {
    pub providers: HashSet<String>,
    /// `host:port` of the service endpoint itself, not of a provider node
    pub address: String,
}

/// One connection held by a peer, as reported by its bus-info
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoConnection {
    /// Connection id, unique within the reporting peer only
    pub id: i64,
    /// Counterpart, usually a URI or a node name
    pub to: String,
    /// Direction code, conventionally `i` or `o`
    pub direction: char,
    pub transport: String,
    pub topic: String,
    pub connected: bool,
}

impl InfoConnection {
    #[inline]
    pub fn is_inbound(&self) -> bool {
        self.direction == 'i'
    }

    #[inline]
    pub fn is_outbound(&self) -> bool {
        self.direction == 'o'
    }
}
