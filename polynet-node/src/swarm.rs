//! Swarm used when no transport is configured.

use async_trait::async_trait;
use polynet_crypto::keys::Keypair;
use polynet_net::swarm::{SecureSwarm, SwarmRecvFn};
use polynet_net::NetworkError;
use polynet_types::constants::DEFAULT_MTU;
use polynet_types::primitives::{PublicKey, TransportAddr};

/// A swarm with an identity but no sockets. It listens on nothing and
/// reaches nobody, which is all the loopback network needs.
pub struct LocalSwarm {
    public_key: PublicKey,
}

impl LocalSwarm {
    pub fn new(keypair: &Keypair) -> Self {
        Self {
            public_key: keypair.public_key(),
        }
    }

    fn no_transport(addr: &TransportAddr) -> NetworkError {
        NetworkError::Transport {
            reason: format!("no transport configured for {}", addr),
        }
    }
}

#[async_trait]
impl SecureSwarm for LocalSwarm {
    async fn tell(&self, dst: &TransportAddr, _data: &[u8]) -> Result<(), NetworkError> {
        Err(Self::no_transport(dst))
    }

    /// Nothing ever arrives, so the callback is dropped.
    fn on_tell(&self, _f: SwarmRecvFn) {}

    fn local_addrs(&self) -> Vec<TransportAddr> {
        Vec::new()
    }

    fn local_public_key(&self) -> PublicKey {
        self.public_key
    }

    async fn lookup_public_key(&self, addr: &TransportAddr) -> Result<PublicKey, NetworkError> {
        Err(Self::no_transport(addr))
    }

    fn mtu(&self) -> usize {
        DEFAULT_MTU
    }

    async fn close(&self) -> Result<(), NetworkError> {
        Ok(())
    }
}
