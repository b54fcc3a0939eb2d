//! In-memory registry and peer network
//!
//! Both sides keep their state behind a `parking_lot::Mutex` and never
//! hold it across an await point. Latency is simulated with
//! `tokio::time::sleep`, so tests can run on a paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use rostopo_core::{
    NameNodes, PeerClient, PeerConnector, PeerError, RegistryCall, RegistryClient, RegistryError,
    SystemState, TopicType, Value,
};

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Default)]
struct RegistryState {
    system: SystemState,
    types: Vec<TopicType>,
    node_urls: HashMap<String, String>,
    service_urls: HashMap<String, String>,
    faults: HashMap<RegistryCall, RegistryError>,
    calls: Vec<RegistryCall>,
    lookup_delay: Duration,
}

/// An in-memory registry
#[derive(Default)]
pub struct SimulatedRegistry {
    state: Mutex<RegistryState>,
    lookups_in_flight: AtomicUsize,
    peak_lookups: AtomicUsize,
}

impl SimulatedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node's peer endpoint URL
    pub fn add_node(&self, name: &str, url: &str) {
        self.state
            .lock()
            .node_urls
            .insert(name.to_string(), url.to_string());
    }

    pub fn set_topic_type(&self, topic: &str, type_name: &str) {
        let mut state = self.state.lock();
        state.types.retain(|t| t.name != topic);
        state.types.push(TopicType::new(topic, type_name));
    }

    pub fn add_publisher(&self, topic: &str, node: &str) {
        attach(&mut self.state.lock().system.published, topic, node);
    }

    pub fn add_subscriber(&self, topic: &str, node: &str) {
        attach(&mut self.state.lock().system.subscribed, topic, node);
    }

    /// Register `node` as a provider of `service`, served at `url`
    pub fn add_service(&self, service: &str, node: &str, url: &str) {
        let mut state = self.state.lock();
        attach(&mut state.system.services, service, node);
        state
            .service_urls
            .insert(service.to_string(), url.to_string());
    }

    /// Replace the whole system-state snapshot
    pub fn set_system_state(&self, system: SystemState) {
        self.state.lock().system = system;
    }

    /// Make every future `call` fail with `error`
    pub fn fail(&self, call: RegistryCall, error: RegistryError) {
        self.state.lock().faults.insert(call, error);
    }

    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    /// Delay applied to every lookup
    pub fn set_lookup_delay(&self, delay: Duration) {
        self.state.lock().lookup_delay = delay;
    }

    /// Every call received so far, in arrival order
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.state.lock().calls.clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, RegistryCall::LookupNode(_) | RegistryCall::LookupService(_)))
            .count()
    }

    /// Highest number of lookups observed in flight at once
    pub fn peak_concurrent_lookups(&self) -> usize {
        self.peak_lookups.load(Ordering::SeqCst)
    }

    fn record(&self, call: RegistryCall) -> Result<(), RegistryError> {
        let mut state = self.state.lock();
        state.calls.push(call.clone());
        match state.faults.get(&call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn lookup(
        &self,
        call: RegistryCall,
        resolve: impl FnOnce(&RegistryState) -> Result<String, RegistryError>,
    ) -> Result<String, RegistryError> {
        let now = self.lookups_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lookups.fetch_max(now, Ordering::SeqCst);

        let delay = self.state.lock().lookup_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let result = self.record(call).and_then(|_| resolve(&self.state.lock()));
        self.lookups_in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn attach(entries: &mut Vec<NameNodes>, name: &str, node: &str) {
    match entries.iter_mut().find(|e| e.name == name) {
        Some(entry) => {
            if !entry.nodes.iter().any(|n| n == node) {
                entry.nodes.push(node.to_string());
            }
        }
        None => entries.push(NameNodes::new(name, [node])),
    }
}

#[async_trait]
impl RegistryClient for SimulatedRegistry {
    async fn get_system_state(&self) -> Result<SystemState, RegistryError> {
        self.record(RegistryCall::GetSystemState)?;
        Ok(self.state.lock().system.clone())
    }

    async fn get_topic_types(&self) -> Result<Vec<TopicType>, RegistryError> {
        self.record(RegistryCall::GetTopicTypes)?;
        Ok(self.state.lock().types.clone())
    }

    async fn lookup_node(&self, name: &str) -> Result<String, RegistryError> {
        self.lookup(RegistryCall::LookupNode(name.to_string()), |state| {
            state
                .node_urls
                .get(name)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownNode(name.to_string()))
        })
        .await
    }

    async fn lookup_service(&self, name: &str) -> Result<String, RegistryError> {
        self.lookup(RegistryCall::LookupService(name.to_string()), |state| {
            state
                .service_urls
                .get(name)
                .cloned()
                .ok_or_else(|| RegistryError::UnknownService(name.to_string()))
        })
        .await
    }
}

// ============================================================================
// PEERS
// ============================================================================

/// Behaviour of one simulated peer
#[derive(Clone, Debug)]
pub struct PeerBehaviour {
    pub pid: i64,
    pub latency: Duration,
    pub bus_info: Vec<Vec<Value>>,
    /// When set, every request fails with this error
    pub failure: Option<PeerError>,
    pub alive: bool,
}

impl Default for PeerBehaviour {
    fn default() -> Self {
        PeerBehaviour {
            pid: 1,
            latency: Duration::ZERO,
            bus_info: Vec::new(),
            failure: None,
            alive: true,
        }
    }
}

impl PeerBehaviour {
    pub fn with_pid(pid: i64) -> Self {
        PeerBehaviour {
            pid,
            ..Self::default()
        }
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn bus_info(mut self, bus_info: Vec<Vec<Value>>) -> Self {
        self.bus_info = bus_info;
        self
    }

    pub fn failing(mut self, error: PeerError) -> Self {
        self.failure = Some(error);
        self
    }
}

/// A request observed by the simulated network
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerEvent {
    Connected { address: String, caller_id: String },
    GetPid { address: String },
    Shutdown { address: String, reason: String },
    GetBusInfo { address: String },
}

#[derive(Default)]
struct NetworkState {
    peers: HashMap<String, PeerBehaviour>,
    events: Vec<PeerEvent>,
}

/// Peers keyed by `host:port`
#[derive(Clone, Default)]
pub struct SimulatedNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl SimulatedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_peer(&self, address: &str, behaviour: PeerBehaviour) {
        self.state
            .lock()
            .peers
            .insert(address.to_string(), behaviour);
    }

    pub fn peer(&self, address: &str) -> Option<PeerBehaviour> {
        self.state.lock().peers.get(address).cloned()
    }

    pub fn events(&self) -> Vec<PeerEvent> {
        self.state.lock().events.clone()
    }

    /// Number of clients opened so far
    pub fn connections_opened(&self) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| matches!(e, PeerEvent::Connected { .. }))
            .count()
    }
}

#[async_trait]
impl PeerConnector for SimulatedNetwork {
    async fn connect(
        &self,
        address: &str,
        caller_id: &str,
    ) -> Result<Box<dyn PeerClient>, PeerError> {
        let mut state = self.state.lock();
        if !state.peers.contains_key(address) {
            return Err(PeerError::Unreachable(format!(
                "connection refused: {}",
                address
            )));
        }
        state.events.push(PeerEvent::Connected {
            address: address.to_string(),
            caller_id: caller_id.to_string(),
        });

        Ok(Box::new(SimulatedPeerClient {
            address: address.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct SimulatedPeerClient {
    address: String,
    state: Arc<Mutex<NetworkState>>,
}

impl SimulatedPeerClient {
    /// Record `event`, wait out the peer's latency and return its behaviour
    async fn exchange(&self, event: PeerEvent) -> Result<PeerBehaviour, PeerError> {
        let behaviour = {
            let mut state = self.state.lock();
            state.events.push(event);
            state
                .peers
                .get(&self.address)
                .cloned()
                .ok_or_else(|| PeerError::Unreachable(format!("peer gone: {}", self.address)))?
        };

        if !behaviour.latency.is_zero() {
            tokio::time::sleep(behaviour.latency).await;
        }

        if let Some(err) = behaviour.failure.clone() {
            return Err(err);
        }
        if !behaviour.alive {
            return Err(PeerError::Unreachable(format!(
                "peer shut down: {}",
                self.address
            )));
        }
        Ok(behaviour)
    }
}

#[async_trait]
impl PeerClient for SimulatedPeerClient {
    async fn get_pid(&self) -> Result<i64, PeerError> {
        let behaviour = self
            .exchange(PeerEvent::GetPid {
                address: self.address.clone(),
            })
            .await?;
        Ok(behaviour.pid)
    }

    async fn shutdown(&self, reason: &str) -> Result<(), PeerError> {
        self.exchange(PeerEvent::Shutdown {
            address: self.address.clone(),
            reason: reason.to_string(),
        })
        .await?;

        if let Some(peer) = self.state.lock().peers.get_mut(&self.address) {
            peer.alive = false;
        }
        Ok(())
    }

    async fn get_bus_info(&self) -> Result<Vec<Vec<Value>>, PeerError> {
        let behaviour = self
            .exchange(PeerEvent::GetBusInfo {
                address: self.address.clone(),
            })
            .await?;
        Ok(behaviour.bus_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_records_calls_and_faults() {
        let registry = SimulatedRegistry::new();
        registry.add_node("/talker", "http://host-a:4000/");

        assert_eq!(
            registry.lookup_node("/talker").await.unwrap(),
            "http://host-a:4000/"
        );
        assert_eq!(
            registry.lookup_node("/nobody").await,
            Err(RegistryError::UnknownNode("/nobody".to_string()))
        );

        registry.fail(
            RegistryCall::GetSystemState,
            RegistryError::Unavailable("down".to_string()),
        );
        assert!(registry.get_system_state().await.is_err());
        assert_eq!(registry.calls().len(), 3);
        assert_eq!(registry.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_attach_deduplicates() {
        let registry = SimulatedRegistry::new();
        registry.add_publisher("/chatter", "/talker");
        registry.add_publisher("/chatter", "/talker");
        registry.add_publisher("/chatter", "/talker2");

        let state = registry.get_system_state().await.unwrap();
        assert_eq!(state.published.len(), 1);
        assert_eq!(state.published[0].nodes, vec!["/talker", "/talker2"]);
    }

    #[tokio::test]
    async fn test_shutdown_marks_peer_dead() {
        let network = SimulatedNetwork::new();
        network.add_peer("host-a:4000", PeerBehaviour::with_pid(42));

        let client = network.connect("host-a:4000", "/test").await.unwrap();
        assert_eq!(client.get_pid().await.unwrap(), 42);
        client.shutdown("bye").await.unwrap();
        assert!(client.get_pid().await.is_err());
        assert!(!network.peer("host-a:4000").unwrap().alive);
    }

    #[tokio::test]
    async fn test_connect_to_unknown_address_fails() {
        let network = SimulatedNetwork::new();
        assert!(network.connect("nowhere:1", "/test").await.is_err());
        assert_eq!(network.connections_opened(), 0);
    }
}
