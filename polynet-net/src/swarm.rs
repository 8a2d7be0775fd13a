//! The secure transport a network is built on.
//!
//! Concrete swarms (UDP, QUIC, handshake wrappers) live outside this crate;
//! networks only see them through [`SecureSwarm`].

use std::sync::Arc;

use async_trait::async_trait;
use polynet_types::primitives::{PublicKey, TransportAddr};

use crate::error::NetworkError;

/// Callback for datagrams arriving on a swarm, as `(from, payload)`.
pub type SwarmRecvFn = Arc<dyn Fn(&TransportAddr, &[u8]) + Send + Sync>;

/// An authenticated, encrypted point-to-point transport.
#[async_trait]
pub trait SecureSwarm: Send + Sync {
    /// Send one datagram to a transport address.
    async fn tell(&self, dst: &TransportAddr, data: &[u8]) -> Result<(), NetworkError>;

    /// Install the inbound datagram callback.
    fn on_tell(&self, f: SwarmRecvFn);

    /// Addresses this swarm is listening on.
    fn local_addrs(&self) -> Vec<TransportAddr>;

    /// Public key the swarm authenticates as.
    fn local_public_key(&self) -> PublicKey;

    /// Public key of the peer at a transport address.
    async fn lookup_public_key(&self, addr: &TransportAddr) -> Result<PublicKey, NetworkError>;

    fn mtu(&self) -> usize;

    async fn close(&self) -> Result<(), NetworkError>;
}
