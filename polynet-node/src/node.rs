use std::fmt;
use std::sync::Arc;

use polynet_crypto::keys::Keypair;
use polynet_net::factory::NetworkParams;
use polynet_net::peer_store::{MemPeerStore, PeerStore};
use polynet_net::swarm::SecureSwarm;
use polynet_net::{MultiNetwork, Network};
use polynet_types::primitives::TransportAddr;
use polynet_types::Addr;
use tracing::{error, info, warn};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::registry::NetworkRegistry;

/// The main node: a swarm plus the composite network built on top of it.
pub struct Node {
    local_addr: Addr,
    swarm: Arc<dyn SecureSwarm>,
    peers: Arc<MemPeerStore>,
    network: Arc<MultiNetwork>,
}

/// Point-in-time view of a node, as printed by `polynet status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub local_addr: Addr,
    pub transport_addrs: Vec<TransportAddr>,
    pub networks: Vec<String>,
    pub peers: Vec<(Addr, Vec<TransportAddr>)>,
}

/// Build the peer store from the configured peers.
fn build_peer_store(config: &NodeConfig) -> MemPeerStore {
    let store = MemPeerStore::new();
    for peer in &config.peers {
        if !store.add(peer.id) {
            warn!(peer = %peer.id, "duplicate peer in config, merging addresses");
        }
        let mut addrs = store.list_addrs(&peer.id);
        addrs.extend(peer.addrs.iter().cloned());
        store.set_addrs(&peer.id, addrs);
    }
    store
}

impl Node {
    /// Assemble a node. Every configured network name must be present in
    /// `registry`; constituents keep the order they have in the config.
    ///
    /// If a network fails to build, the ones already built are closed
    /// before the error is returned.
    pub async fn new(
        config: &NodeConfig,
        keypair: &Keypair,
        swarm: Arc<dyn SecureSwarm>,
        registry: &NetworkRegistry,
    ) -> Result<Self, NodeError> {
        if config.networks.is_empty() {
            return Err(NodeError::ConfigError {
                reason: "no networks configured".to_string(),
            });
        }
        if swarm.local_public_key() != keypair.public_key() {
            return Err(NodeError::KeyError {
                reason: "swarm identity does not match node key".to_string(),
            });
        }
        registry.validate(&config.networks)?;

        let peers = Arc::new(build_peer_store(config));
        let params = NetworkParams {
            swarm: Arc::clone(&swarm),
            peers: Arc::clone(&peers) as Arc<dyn PeerStore>,
        };

        let mut constituents = Vec::with_capacity(config.networks.len());
        for name in &config.networks {
            match registry.get(name)?.build(params.clone()) {
                Ok(network) => constituents.push((name.clone(), network)),
                Err(e) => {
                    error!(network = %name, error = %e, "failed to build network");
                    let partial = MultiNetwork::with_names(constituents);
                    if let Err(close_err) = partial.close().await {
                        warn!(error = %close_err, "failed to close partially built networks");
                    }
                    return Err(e.into());
                }
            }
        }

        let local_addr = keypair.addr();
        info!(
            %local_addr,
            networks = ?config.networks,
            peers = peers.len(),
            "node assembled"
        );

        Ok(Self {
            local_addr,
            swarm,
            peers,
            network: Arc::new(MultiNetwork::with_names(constituents)),
        })
    }

    /// The composite network.
    pub fn network(&self) -> Arc<MultiNetwork> {
        Arc::clone(&self.network)
    }

    pub fn local_addr(&self) -> Addr {
        self.local_addr
    }

    pub fn peers(&self) -> &MemPeerStore {
        &self.peers
    }

    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            local_addr: self.local_addr,
            transport_addrs: self.swarm.local_addrs(),
            networks: self.network.names().map(str::to_string).collect(),
            peers: self
                .peers
                .list_peers()
                .into_iter()
                .map(|peer| {
                    let addrs = self.peers.list_addrs(&peer);
                    (peer, addrs)
                })
                .collect(),
        }
    }

    /// Close the composite network, then the swarm. Both are always closed;
    /// the first failure is returned.
    pub async fn close(&self) -> Result<(), NodeError> {
        let network_result = self.network.close().await;
        if let Err(ref e) = network_result {
            error!(error = %e, "failed to close networks");
        }
        let swarm_result = self.swarm.close().await;
        if let Err(ref e) = swarm_result {
            error!(error = %e, "failed to close swarm");
        }
        network_result?;
        swarm_result?;
        info!(local_addr = %self.local_addr, "node closed");
        Ok(())
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "LOCAL ADDR")?;
        writeln!(f, "  {}", self.local_addr)?;
        for addr in &self.transport_addrs {
            writeln!(f, "  {}", addr)?;
        }
        writeln!(f)?;
        writeln!(f, "NETWORKS")?;
        for name in &self.networks {
            writeln!(f, "  {}", name)?;
        }
        writeln!(f)?;
        writeln!(f, "PEERS")?;
        if self.peers.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (peer, addrs) in &self.peers {
            writeln!(f, "  {}", peer)?;
            for addr in addrs {
                writeln!(f, "    {}", addr)?;
            }
        }
        Ok(())
    }
}
