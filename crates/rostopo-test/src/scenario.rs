//! Ready-made graphs wired to an inspector

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rostopo_runtime::{ConfigError, Inspector, InspectorConfig};

use crate::{PeerBehaviour, SimulatedNetwork, SimulatedRegistry};

/// A simulated registry plus the peers it points at
#[derive(Default)]
pub struct Scenario {
    pub registry: Arc<SimulatedRegistry>,
    pub network: SimulatedNetwork,
    next_pid: AtomicI64,
}

impl Scenario {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A small robot graph:
    ///
    /// | node          | host    | role                                      |
    /// |---------------|---------|-------------------------------------------|
    /// | `/talker`     | robot-1 | publishes `/chatter`, `/rosout`           |
    /// | `/listener`   | robot-2 | subscribes `/chatter`                     |
    /// | `/lidar`      | robot-1 | publishes `/scan` (no registered type)    |
    /// | `/map_server` | robot-3 | provides `/static_map` only               |
    /// | `/rosout`     | robot-1 | subscribes `/rosout`, provides `/rosout/get_loggers` |
    pub fn robot() -> Self {
        let s = Self::empty();

        s.spawn_node("/talker", "robot-1", 40001);
        s.spawn_node("/listener", "robot-2", 40002);
        s.spawn_node("/lidar", "robot-1", 40003);
        s.spawn_node("/map_server", "robot-3", 40004);
        s.spawn_node("/rosout", "robot-1", 40005);

        s.registry.set_topic_type("/chatter", "std_msgs/String");
        s.registry.set_topic_type("/rosout", "rosgraph_msgs/Log");

        s.registry.add_publisher("/chatter", "/talker");
        s.registry.add_subscriber("/chatter", "/listener");
        s.registry.add_publisher("/rosout", "/talker");
        s.registry.add_subscriber("/rosout", "/rosout");
        s.registry.add_publisher("/scan", "/lidar");

        s.registry
            .add_service("/static_map", "/map_server", "rosrpc://robot-3:41004");
        s.registry
            .add_service("/rosout/get_loggers", "/rosout", "rosrpc://robot-1:41005");

        s
    }

    /// Register a node at `host:port` and bring up a healthy peer there.
    /// Returns the peer address.
    pub fn spawn_node(&self, name: &str, host: &str, port: u16) -> String {
        let address = format!("{}:{}", host, port);
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst) + 100;

        self.registry
            .add_node(name, &format!("http://{}:{}/", host, port));
        self.network.add_peer(&address, PeerBehaviour::with_pid(pid));
        address
    }

    pub fn inspector(&self) -> Inspector {
        Inspector::new(self.registry.clone(), Arc::new(self.network.clone()))
    }

    pub fn inspector_with(&self, config: InspectorConfig) -> Result<Inspector, ConfigError> {
        Inspector::with_config(self.registry.clone(), Arc::new(self.network.clone()), config)
    }
}
