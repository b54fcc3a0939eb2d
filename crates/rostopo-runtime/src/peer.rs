//! Live peer inspection
//!
//! Each action resolves the target node, opens a fresh peer client and
//! issues exactly one request. Nothing is retried here.

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use rostopo_core::{decode_connections, InfoConnection, PeerCall, TopologyResult};

use crate::Inspector;

/// Outcome of a liveness sweep, per node
pub type PingReport = HashMap<String, TopologyResult<Duration>>;

impl Inspector {
    /// Round-trip time of a liveness query to `node`
    pub async fn ping_node(&self, node: &str) -> TopologyResult<Duration> {
        let address = self.lookup_target(node).await?;
        self.ping_address(node, address).await
    }

    /// Ask `node` to shut down. Success means the request was accepted,
    /// not that the node has exited.
    pub async fn kill_node(&self, node: &str) -> TopologyResult<()> {
        let address = self.lookup_target(node).await?;
        let peer = self.open_peer(node, address).await?;

        peer.client
            .shutdown("")
            .await
            .map_err(|e| peer.unreachable(PeerCall::Shutdown, e))?;

        tracing::info!(node, address = %peer.address, "shutdown requested");
        Ok(())
    }

    /// Connections currently held by `node`, in the order it reports them.
    ///
    /// One malformed bus-info entry fails the whole call.
    pub async fn get_node_conns(&self, node: &str) -> TopologyResult<Vec<InfoConnection>> {
        let address = self.lookup_target(node).await?;
        let peer = self.open_peer(node, address).await?;

        let raw = peer
            .client
            .get_bus_info()
            .await
            .map_err(|e| peer.unreachable(PeerCall::GetBusInfo, e))?;

        let conns = decode_connections(&raw)?;
        tracing::debug!(node, count = conns.len(), "decoded bus info");
        Ok(conns)
    }

    /// Ping every node known to the registry.
    ///
    /// Fails only if the node list itself cannot be built. Individual
    /// peers that do not answer are reported in the map.
    pub async fn ping_all(&self) -> TopologyResult<PingReport> {
        let nodes = self.get_nodes().await?;

        let report = stream::iter(nodes)
            .map(|(name, info)| async move {
                let rtt = self.ping_address(&name, info.address).await;
                (name, rtt)
            })
            .buffer_unordered(self.lookup_concurrency())
            .collect::<PingReport>()
            .await;

        let failed = report.values().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, total = report.len(), "some nodes did not answer");
        }
        Ok(report)
    }

    async fn ping_address(&self, node: &str, address: String) -> TopologyResult<Duration> {
        let peer = self.open_peer(node, address).await?;

        let start = Instant::now();
        peer.client
            .get_pid()
            .await
            .map_err(|e| peer.unreachable(PeerCall::GetPid, e))?;
        let rtt = start.elapsed();

        tracing::debug!(node, address = %peer.address, ?rtt, "pong");
        Ok(rtt)
    }
}
