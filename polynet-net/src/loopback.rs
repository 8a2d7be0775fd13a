//! A network that reaches exactly one address: our own.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use polynet_crypto::address::pubkey_to_addr;
use polynet_types::addr::check_prefix;
use polynet_types::constants::DEFAULT_MTU;
use polynet_types::primitives::PublicKey;
use polynet_types::Addr;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::NetworkError;
use crate::factory::NetworkSpec;
use crate::network::{noop_recv, Network, RecvFn};

/// Delivers datagrams addressed to the local node straight back to the
/// registered receive callback.
pub struct LoopbackNetwork {
    local_addr: Addr,
    public_key: PublicKey,
    recv: RwLock<RecvFn>,
}

impl LoopbackNetwork {
    /// Name under which the loopback network is registered.
    pub const NAME: &'static str = "loopback";

    pub fn new(public_key: PublicKey) -> Self {
        Self {
            local_addr: pubkey_to_addr(&public_key),
            public_key,
            recv: RwLock::new(noop_recv()),
        }
    }

    /// [`NetworkSpec`] building a loopback network for the swarm's own identity.
    pub fn spec() -> NetworkSpec {
        NetworkSpec::new(Self::NAME, |params| {
            let network: Arc<dyn Network> =
                Arc::new(LoopbackNetwork::new(params.swarm.local_public_key()));
            Ok(network)
        })
    }

    pub fn local_addr(&self) -> Addr {
        self.local_addr
    }

    fn check_local(&self, addr: &Addr) -> Result<(), NetworkError> {
        if *addr != self.local_addr {
            return Err(NetworkError::AddrUnreachable { addr: *addr });
        }
        Ok(())
    }
}

#[async_trait]
impl Network for LoopbackNetwork {
    async fn tell(&self, dst: &Addr, data: &[u8]) -> Result<(), NetworkError> {
        self.check_local(dst)?;
        if data.len() > DEFAULT_MTU {
            return Err(NetworkError::MessageTooLarge {
                size: data.len(),
                mtu: DEFAULT_MTU,
            });
        }
        let recv = Arc::clone(&self.recv.read().unwrap_or_else(PoisonError::into_inner));
        trace!(dst = %dst, len = data.len(), "loopback delivery");
        recv(&self.local_addr, dst, data);
        Ok(())
    }

    fn on_recv(&self, f: RecvFn) {
        *self.recv.write().unwrap_or_else(PoisonError::into_inner) = f;
    }

    async fn mtu(&self, target: &Addr) -> Result<usize, NetworkError> {
        self.check_local(target)?;
        Ok(DEFAULT_MTU)
    }

    async fn lookup_public_key(&self, target: &Addr) -> Result<PublicKey, NetworkError> {
        self.check_local(target)?;
        Ok(self.public_key)
    }

    async fn find_addr(
        &self,
        prefix: &[u8],
        nbits: usize,
        _cancel: &CancellationToken,
    ) -> Result<Addr, NetworkError> {
        check_prefix(prefix, nbits)?;
        if self.local_addr.has_prefix(prefix, nbits) {
            Ok(self.local_addr)
        } else {
            Err(NetworkError::PrefixNotFound {
                prefix: hex::encode(prefix),
                nbits,
            })
        }
    }

    async fn close(&self) -> Result<(), NetworkError> {
        Ok(())
    }
}
