//! Node assembly against a recording swarm and custom network specs:
//! config order, peer store wiring, status and shutdown ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use polynet_crypto::keys::Keypair;
use polynet_net::factory::NetworkSpec;
use polynet_net::loopback::LoopbackNetwork;
use polynet_net::peer_store::PeerStore;
use polynet_net::swarm::{SecureSwarm, SwarmRecvFn};
use polynet_net::{Network, NetworkError};
use polynet_node::config::{NodeConfig, PeerConfig};
use polynet_node::error::NodeError;
use polynet_node::node::Node;
use polynet_node::registry::NetworkRegistry;
use polynet_types::primitives::{PublicKey, TransportAddr};
use polynet_types::Addr;
use tokio_util::sync::CancellationToken;

/// Swarm that records close calls and reports fixed listen addresses.
struct RecordingSwarm {
    public_key: PublicKey,
    listen: Vec<TransportAddr>,
    fail_close: bool,
    close_calls: AtomicUsize,
}

impl RecordingSwarm {
    fn new(keypair: &Keypair) -> Self {
        Self {
            public_key: keypair.public_key(),
            listen: vec!["udp://0.0.0.0:4242".to_string()],
            fail_close: false,
            close_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SecureSwarm for RecordingSwarm {
    async fn tell(&self, dst: &TransportAddr, _data: &[u8]) -> Result<(), NetworkError> {
        Err(NetworkError::Transport {
            reason: format!("unreachable {}", dst),
        })
    }

    fn on_tell(&self, _f: SwarmRecvFn) {}

    fn local_addrs(&self) -> Vec<TransportAddr> {
        self.listen.clone()
    }

    fn local_public_key(&self) -> PublicKey {
        self.public_key
    }

    async fn lookup_public_key(&self, addr: &TransportAddr) -> Result<PublicKey, NetworkError> {
        Err(NetworkError::Transport {
            reason: format!("unknown {}", addr),
        })
    }

    fn mtu(&self) -> usize {
        1200
    }

    async fn close(&self) -> Result<(), NetworkError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(NetworkError::Transport {
                reason: "swarm close failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Loopback wrapper whose close always fails.
struct StuckNetwork(LoopbackNetwork);

#[async_trait]
impl Network for StuckNetwork {
    async fn tell(&self, dst: &Addr, data: &[u8]) -> Result<(), NetworkError> {
        self.0.tell(dst, data).await
    }

    fn on_recv(&self, f: polynet_net::RecvFn) {
        self.0.on_recv(f)
    }

    async fn mtu(&self, target: &Addr) -> Result<usize, NetworkError> {
        self.0.mtu(target).await
    }

    async fn lookup_public_key(&self, target: &Addr) -> Result<PublicKey, NetworkError> {
        self.0.lookup_public_key(target).await
    }

    async fn find_addr(
        &self,
        prefix: &[u8],
        nbits: usize,
        cancel: &CancellationToken,
    ) -> Result<Addr, NetworkError> {
        self.0.find_addr(prefix, nbits, cancel).await
    }

    async fn close(&self) -> Result<(), NetworkError> {
        Err(NetworkError::Transport {
            reason: "stuck".to_string(),
        })
    }
}

/// Loopback wrapper that counts close calls.
struct CountingNetwork {
    inner: LoopbackNetwork,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Network for CountingNetwork {
    async fn tell(&self, dst: &Addr, data: &[u8]) -> Result<(), NetworkError> {
        self.inner.tell(dst, data).await
    }

    fn on_recv(&self, f: polynet_net::RecvFn) {
        self.inner.on_recv(f)
    }

    async fn mtu(&self, target: &Addr) -> Result<usize, NetworkError> {
        self.inner.mtu(target).await
    }

    async fn lookup_public_key(&self, target: &Addr) -> Result<PublicKey, NetworkError> {
        self.inner.lookup_public_key(target).await
    }

    async fn find_addr(
        &self,
        prefix: &[u8],
        nbits: usize,
        cancel: &CancellationToken,
    ) -> Result<Addr, NetworkError> {
        self.inner.find_addr(prefix, nbits, cancel).await
    }

    async fn close(&self) -> Result<(), NetworkError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn keypair() -> Keypair {
    Keypair::from_seed(&[11u8; 32])
}

fn config_with(networks: &[&str]) -> NodeConfig {
    NodeConfig {
        networks: networks.iter().map(|n| n.to_string()).collect(),
        ..NodeConfig::default()
    }
}

fn stuck_spec(name: &str) -> NetworkSpec {
    NetworkSpec::new(name, |params| {
        let network: Arc<dyn Network> = Arc::new(StuckNetwork(LoopbackNetwork::new(
            params.swarm.local_public_key(),
        )));
        Ok(network)
    })
}

#[tokio::test]
async fn test_constituents_follow_config_order() {
    let kp = keypair();
    let mut registry = NetworkRegistry::builtin();
    registry.register(stuck_spec("stuck"));

    let node = Node::new(
        &config_with(&["stuck", "loopback"]),
        &kp,
        Arc::new(RecordingSwarm::new(&kp)),
        &registry,
    )
    .await
    .unwrap();

    let network = node.network();
    assert_eq!(network.names().collect::<Vec<_>>(), vec!["stuck", "loopback"]);

    // Both reach the local address; the first configured one owns it.
    network.tell(&kp.addr(), b"ping").await.unwrap();
    assert_eq!(network.cached_owner(&kp.addr()), Some("stuck"));
}

#[tokio::test]
async fn test_factories_see_configured_peers() {
    let kp = keypair();
    let seen: Arc<Mutex<Vec<(Addr, Vec<TransportAddr>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut registry = NetworkRegistry::builtin();
    registry.register(NetworkSpec::new("observer", move |params| {
        let mut seen = sink.lock().unwrap();
        for peer in params.peers.list_peers() {
            seen.push((peer, params.peers.list_addrs(&peer)));
        }
        let network: Arc<dyn Network> =
            Arc::new(LoopbackNetwork::new(params.swarm.local_public_key()));
        Ok(network)
    }));

    let mut config = config_with(&["loopback", "observer"]);
    config.peers = vec![
        PeerConfig {
            id: Addr::new([2u8; 32]),
            addrs: vec!["udp://10.0.0.2:4242".to_string()],
        },
        PeerConfig {
            id: Addr::new([1u8; 32]),
            addrs: vec![],
        },
    ];

    Node::new(&config, &kp, Arc::new(RecordingSwarm::new(&kp)), &registry)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (Addr::new([1u8; 32]), vec![]),
            (Addr::new([2u8; 32]), vec!["udp://10.0.0.2:4242".to_string()]),
        ]
    );
}

#[tokio::test]
async fn test_factory_failure_surfaces() {
    let kp = keypair();
    let mut registry = NetworkRegistry::builtin();
    registry.register(NetworkSpec::new("broken", |_| {
        Err(NetworkError::Transport {
            reason: "no socket".to_string(),
        })
    }));

    let result = Node::new(
        &config_with(&["loopback", "broken"]),
        &kp,
        Arc::new(RecordingSwarm::new(&kp)),
        &registry,
    )
    .await;
    assert!(matches!(
        result,
        Err(NodeError::NetworkError(NetworkError::Transport { .. }))
    ));
}

#[tokio::test]
async fn test_factory_failure_closes_built_networks() {
    let kp = keypair();
    let closes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&closes);

    let mut registry = NetworkRegistry::builtin();
    registry.register(NetworkSpec::new("counted", move |params| {
        let network: Arc<dyn Network> = Arc::new(CountingNetwork {
            inner: LoopbackNetwork::new(params.swarm.local_public_key()),
            closes: Arc::clone(&counter),
        });
        Ok(network)
    }));
    registry.register(NetworkSpec::new("broken", |_| {
        Err(NetworkError::Transport {
            reason: "no socket".to_string(),
        })
    }));

    let result = Node::new(
        &config_with(&["counted", "broken"]),
        &kp,
        Arc::new(RecordingSwarm::new(&kp)),
        &registry,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_status_lists_transport_addrs() {
    let kp = keypair();
    let node = Node::new(
        &NodeConfig::default(),
        &kp,
        Arc::new(RecordingSwarm::new(&kp)),
        &NetworkRegistry::builtin(),
    )
    .await
    .unwrap();

    let status = node.status();
    assert_eq!(status.local_addr, kp.addr());
    assert_eq!(status.transport_addrs, vec!["udp://0.0.0.0:4242".to_string()]);
    assert!(status
        .to_string()
        .contains(&format!("LOCAL ADDR\n  {}\n  udp://0.0.0.0:4242\n", kp.addr())));
}

#[tokio::test]
async fn test_close_closes_swarm_after_network_failure() {
    let kp = keypair();
    let swarm = Arc::new(RecordingSwarm::new(&kp));
    let mut registry = NetworkRegistry::builtin();
    registry.register(stuck_spec("stuck"));

    let node = Node::new(
        &config_with(&["stuck"]),
        &kp,
        Arc::clone(&swarm) as Arc<dyn SecureSwarm>,
        &registry,
    )
    .await
    .unwrap();

    let err = node.close().await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::NetworkError(NetworkError::ShutdownFailed { ref network, .. }) if network == "stuck"
    ));
    assert_eq!(swarm.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_close_reports_swarm_failure() {
    let kp = keypair();
    let swarm = Arc::new(RecordingSwarm {
        fail_close: true,
        ..RecordingSwarm::new(&kp)
    });

    let node = Node::new(
        &NodeConfig::default(),
        &kp,
        Arc::clone(&swarm) as Arc<dyn SecureSwarm>,
        &NetworkRegistry::builtin(),
    )
    .await
    .unwrap();

    let err = node.close().await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::NetworkError(NetworkError::Transport { .. })
    ));
    assert_eq!(swarm.close_calls.load(Ordering::SeqCst), 1);
    assert!(matches!(
        node.network().tell(&kp.addr(), b"late").await,
        Err(NetworkError::Closed)
    ));
}
