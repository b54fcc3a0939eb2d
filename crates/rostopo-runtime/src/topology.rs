//! Graph aggregation over registry snapshots
//!
//! Node, topic and service views are rebuilt from scratch on every call.
//! Address lookups fan out across the bounded worker limit and either all
//! succeed or the whole call fails with the first lookup error.

use std::collections::HashSet;

use rostopo_core::{
    split_host_port, InfoNode, InfoTopic, MachineSet, NameNodes, NodeMap,
    ServiceMap, TopicMap, TopologyError, TopologyResult,
};

use crate::fanout::try_join_bounded;
use crate::Inspector;

impl Inspector {
    /// All nodes known to the registry, with their topics, services and
    /// resolved `host:port`.
    ///
    /// A node appearing in any category is included, even if it only
    /// provides services. Fails if any node address cannot be resolved.
    pub async fn get_nodes(&self) -> TopologyResult<NodeMap> {
        let state = self.system_state().await?;

        let mut nodes = NodeMap::new();

        for entry in &state.published {
            for node in &entry.nodes {
                nodes
                    .entry(node.clone())
                    .or_default()
                    .published_topics
                    .insert(entry.name.clone());
            }
        }

        for entry in &state.subscribed {
            for node in &entry.nodes {
                nodes
                    .entry(node.clone())
                    .or_default()
                    .subscribed_topics
                    .insert(entry.name.clone());
            }
        }

        for entry in &state.services {
            for node in &entry.nodes {
                nodes
                    .entry(node.clone())
                    .or_default()
                    .provided_services
                    .insert(entry.name.clone());
            }
        }

        let names: Vec<String> = nodes.keys().cloned().collect();
        let addresses = try_join_bounded(names, self.lookup_concurrency(), |name| async move {
            let address = self.node_address(&name).await?;
            Ok::<_, TopologyError>((name, address))
        })
        .await?;

        for (name, address) in addresses {
            if let Some(info) = nodes.get_mut(&name) {
                info.address = address;
            }
        }

        tracing::debug!(count = nodes.len(), "aggregated nodes");
        Ok(nodes)
    }

    /// All topics with a registered type, with their publishers and
    /// subscribers.
    ///
    /// The type list decides which topics exist. Publishers or subscribers
    /// of a topic with no registered type are left out.
    pub async fn get_topics(&self) -> TopologyResult<TopicMap> {
        let state = self.system_state().await?;
        let types = self.topic_types().await?;

        let mut topics: TopicMap = types
            .into_iter()
            .map(|t| (t.name, InfoTopic::new(t.type_name)))
            .collect();

        for entry in &state.published {
            match topics.get_mut(&entry.name) {
                Some(topic) => topic.publishers.extend(entry.nodes.iter().cloned()),
                None => tracing::debug!(topic = %entry.name, "skipping publishers of untyped topic"),
            }
        }

        for entry in &state.subscribed {
            match topics.get_mut(&entry.name) {
                Some(topic) => topic.subscribers.extend(entry.nodes.iter().cloned()),
                None => tracing::debug!(topic = %entry.name, "skipping subscribers of untyped topic"),
            }
        }

        tracing::debug!(count = topics.len(), "aggregated topics");
        Ok(topics)
    }

    /// All services with their providers and the address of the service
    /// endpoint itself. Fails if any service endpoint cannot be resolved.
    pub async fn get_services(&self) -> TopologyResult<ServiceMap> {
        let state = self.system_state().await?;

        let mut services = ServiceMap::new();
        for entry in &state.services {
            services
                .entry(entry.name.clone())
                .or_default()
                .providers
                .extend(entry.nodes.iter().cloned());
        }

        let names: Vec<String> = services.keys().cloned().collect();
        let addresses = try_join_bounded(names, self.lookup_concurrency(), |name| async move {
            let address = self.service_address(&name).await?;
            Ok::<_, TopologyError>((name, address))
        })
        .await?;

        for (name, address) in addresses {
            if let Some(info) = services.get_mut(&name) {
                info.address = address;
            }
        }

        tracing::debug!(count = services.len(), "aggregated services");
        Ok(services)
    }

    /// Distinct hosts running at least one node.
    ///
    /// Node addresses that do not split into `host:port` are skipped.
    pub async fn get_machines(&self) -> TopologyResult<MachineSet> {
        let nodes = self.get_nodes().await?;
        Ok(machines_of(&nodes))
    }

    /// View of a single node, built from a fresh system-state snapshot.
    ///
    /// A node the registry knows but that takes part in nothing comes back
    /// with empty sets.
    pub async fn get_node(&self, name: &str) -> TopologyResult<InfoNode> {
        let address = self.lookup_target(name).await?;
        let state = self.system_state().await?;

        let attached = |entries: &[NameNodes]| -> HashSet<String> {
            entries
                .iter()
                .filter(|e| e.nodes.iter().any(|n| n == name))
                .map(|e| e.name.clone())
                .collect()
        };

        Ok(InfoNode {
            published_topics: attached(&state.published),
            subscribed_topics: attached(&state.subscribed),
            provided_services: attached(&state.services),
            address,
        })
    }
}

/// Hosts of every node whose address splits into `host:port`. The rest are
/// logged and left out instead of failing the enumeration.
fn machines_of(nodes: &NodeMap) -> MachineSet {
    let mut machines = HashSet::new();
    for (name, info) in nodes {
        match split_host_port(&info.address) {
            Ok((host, _)) => {
                machines.insert(host.to_string());
            }
            Err(err) => {
                tracing::warn!(node = %name, error = %err, "skipping node with unusable address");
            }
        }
    }
    machines
}
