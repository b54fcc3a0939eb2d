//! Inspector - entry point for graph queries and peer actions

use std::sync::Arc;

use rostopo_core::{
    url_to_address, PeerCall, PeerClient, PeerConnector, PeerError, RegistryCall, RegistryClient,
    RegistryError, SystemState, TopicType, TopologyError, TopologyResult,
};

use crate::{ConfigError, InspectorConfig};

/// Pull-based view over a registry and the peers it knows about.
///
/// Holds no graph state of its own; concurrent calls are independent.
pub struct Inspector {
    registry: Arc<dyn RegistryClient>,
    connector: Arc<dyn PeerConnector>,
    config: InspectorConfig,
}

impl Inspector {
    /// Create an inspector with default configuration
    pub fn new(registry: Arc<dyn RegistryClient>, connector: Arc<dyn PeerConnector>) -> Self {
        Inspector {
            registry,
            connector,
            config: InspectorConfig::default(),
        }
    }

    /// Create an inspector with custom configuration
    pub fn with_config(
        registry: Arc<dyn RegistryClient>,
        connector: Arc<dyn PeerConnector>,
        config: InspectorConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Inspector {
            registry,
            connector,
            config,
        })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub(crate) async fn system_state(&self) -> TopologyResult<SystemState> {
        tracing::debug!("querying system state");
        self.registry
            .get_system_state()
            .await
            .map_err(|source| TopologyError::RegistryQueryFailed {
                call: RegistryCall::GetSystemState,
                source,
            })
    }

    pub(crate) async fn topic_types(&self) -> TopologyResult<Vec<TopicType>> {
        tracing::debug!("querying topic types");
        self.registry
            .get_topic_types()
            .await
            .map_err(|source| TopologyError::RegistryQueryFailed {
                call: RegistryCall::GetTopicTypes,
                source,
            })
    }

    /// Resolve a node's address during aggregation
    pub(crate) async fn node_address(&self, node: &str) -> TopologyResult<String> {
        let url = self.registry.lookup_node(node).await.map_err(|source| {
            TopologyError::RegistryQueryFailed {
                call: RegistryCall::LookupNode(node.to_string()),
                source,
            }
        })?;
        let address = url_to_address(&url)?;
        tracing::debug!(node, %url, %address, "resolved node");
        Ok(address)
    }

    /// Resolve a service endpoint during aggregation
    pub(crate) async fn service_address(&self, service: &str) -> TopologyResult<String> {
        let url = self.registry.lookup_service(service).await.map_err(|source| {
            TopologyError::RegistryQueryFailed {
                call: RegistryCall::LookupService(service.to_string()),
                source,
            }
        })?;
        let address = url_to_address(&url)?;
        tracing::debug!(service, %url, %address, "resolved service");
        Ok(address)
    }

    /// Resolve a single node targeted by a peer action or a single-node view
    pub(crate) async fn lookup_target(&self, node: &str) -> TopologyResult<String> {
        let url = self
            .registry
            .lookup_node(node)
            .await
            .map_err(|source| node_lookup_failed(node, source))?;
        Ok(url_to_address(&url)?)
    }

    /// Open a short-lived client for the peer at `address`
    pub(crate) async fn open_peer(&self, node: &str, address: String) -> TopologyResult<PeerSession> {
        let client = self
            .connector
            .connect(&address, &self.config.caller_id)
            .await
            .map_err(|source| TopologyError::PeerUnreachable {
                node: node.to_string(),
                address: address.clone(),
                call: PeerCall::Connect,
                source,
            })?;

        Ok(PeerSession {
            node: node.to_string(),
            address,
            client,
        })
    }

    pub(crate) fn lookup_concurrency(&self) -> usize {
        self.config.lookup_concurrency
    }
}

fn node_lookup_failed(node: &str, source: RegistryError) -> TopologyError {
    TopologyError::NodeLookupFailed {
        node: node.to_string(),
        source,
    }
}

/// A peer client bound to the node it was opened for. Dropped after one call.
pub(crate) struct PeerSession {
    pub node: String,
    pub address: String,
    pub client: Box<dyn PeerClient>,
}

impl PeerSession {
    pub fn unreachable(&self, call: PeerCall, source: PeerError) -> TopologyError {
        TopologyError::PeerUnreachable {
            node: self.node.clone(),
            address: self.address.clone(),
            call,
            source,
        }
    }
}
