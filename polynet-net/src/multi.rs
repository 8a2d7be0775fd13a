//! Multi-network router.
//!
//! Presents an ordered list of constituent networks as a single [`Network`].
//! Each destination is resolved to the constituent that owns it with a
//! discovery fan-out on first use; the answer is cached for the lifetime of
//! the router and never invalidated.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use polynet_types::addr::check_prefix;
use polynet_types::constants::ADDR_BITS;
use polynet_types::primitives::PublicKey;
use polynet_types::Addr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::discovery::find_first;
use crate::error::NetworkError;
use crate::network::{Network, RecvFn};

/// A named member of a [`MultiNetwork`].
#[derive(Clone)]
pub struct Constituent {
    pub name: String,
    pub network: Arc<dyn Network>,
}

/// Routes each address to whichever constituent network can reach it.
pub struct MultiNetwork {
    networks: Vec<Constituent>,
    /// Address → index into `networks`. Append-only.
    owners: DashMap<Addr, usize>,
    /// Cancelled on close; parent of every ownership fan-out.
    shutdown: CancellationToken,
}

impl MultiNetwork {
    /// Compose `networks`, earlier entries taking priority when several can
    /// reach the same address. Members are named `network-{index}`.
    pub fn new(networks: Vec<Arc<dyn Network>>) -> Self {
        Self::with_names(
            networks
                .into_iter()
                .enumerate()
                .map(|(i, network)| (format!("network-{}", i), network))
                .collect(),
        )
    }

    /// Compose named networks, in priority order.
    pub fn with_names(networks: Vec<(String, Arc<dyn Network>)>) -> Self {
        Self {
            networks: networks
                .into_iter()
                .map(|(name, network)| Constituent { name, network })
                .collect(),
            owners: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Number of constituent networks.
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Constituent names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.networks.iter().map(|c| c.name.as_str())
    }

    /// Name of the constituent cached as the owner of `addr`, if resolved.
    pub fn cached_owner(&self, addr: &Addr) -> Option<&str> {
        let index = self.owners.get(addr).map(|entry| *entry)?;
        Some(self.networks[index].name.as_str())
    }

    /// Number of addresses with a cached owner.
    pub fn cached_len(&self) -> usize {
        self.owners.len()
    }

    /// Find the constituent that owns `addr`, discovering it on a cache miss.
    ///
    /// Concurrent misses on the same address each run their own fan-out;
    /// their inserts agree, so the last one simply overwrites.
    async fn which_network(&self, addr: &Addr) -> Result<&Arc<dyn Network>, NetworkError> {
        if self.shutdown.is_cancelled() {
            return Err(NetworkError::Closed);
        }
        if let Some(index) = self.owners.get(addr).map(|entry| *entry) {
            debug!(%addr, network = %self.networks[index].name, "owner cache hit");
            return Ok(&self.networks[index].network);
        }

        debug!(%addr, "owner cache miss");
        match self
            .discover(addr.as_bytes(), ADDR_BITS, &CancellationToken::new())
            .await
        {
            Ok((index, _)) => {
                self.owners.insert(*addr, index);
                info!(%addr, network = %self.networks[index].name, "cached address owner");
                Ok(&self.networks[index].network)
            }
            Err(NetworkError::Discovery(failure)) => {
                warn!(%addr, error = %failure, "no network can reach address");
                Err(NetworkError::AddrUnreachable { addr: *addr })
            }
            Err(e) => Err(e),
        }
    }

    /// Run a discovery fan-out that stops on either `cancel` or `close`.
    ///
    /// Returns `Cancelled` or `Closed` rather than an aggregated failure when
    /// the fan-out was cut short; the abandoned fan-out aborts its tasks.
    async fn discover(
        &self,
        prefix: &[u8],
        nbits: usize,
        cancel: &CancellationToken,
    ) -> Result<(usize, Addr), NetworkError> {
        let outcome = tokio::select! {
            biased;
            outcome = find_first(&self.networks, prefix, nbits, &self.shutdown) => outcome,
            _ = self.shutdown.cancelled() => return Err(NetworkError::Closed),
            _ = cancel.cancelled() => return Err(NetworkError::Cancelled),
        };
        match outcome {
            Ok(found) => Ok(found),
            Err(_) if self.shutdown.is_cancelled() => Err(NetworkError::Closed),
            Err(_) if cancel.is_cancelled() => Err(NetworkError::Cancelled),
            Err(failure) => Err(failure.into()),
        }
    }
}

#[async_trait]
impl Network for MultiNetwork {
    async fn tell(&self, dst: &Addr, data: &[u8]) -> Result<(), NetworkError> {
        let network = self.which_network(dst).await?;
        network.tell(dst, data).await
    }

    fn on_recv(&self, f: RecvFn) {
        for constituent in &self.networks {
            constituent.network.on_recv(Arc::clone(&f));
        }
    }

    async fn mtu(&self, target: &Addr) -> Result<usize, NetworkError> {
        let network = self.which_network(target).await?;
        network.mtu(target).await
    }

    async fn lookup_public_key(&self, target: &Addr) -> Result<PublicKey, NetworkError> {
        let network = self.which_network(target).await?;
        network.lookup_public_key(target).await
    }

    async fn find_addr(
        &self,
        prefix: &[u8],
        nbits: usize,
        cancel: &CancellationToken,
    ) -> Result<Addr, NetworkError> {
        check_prefix(prefix, nbits)?;
        if self.shutdown.is_cancelled() {
            return Err(NetworkError::Closed);
        }
        if cancel.is_cancelled() {
            return Err(NetworkError::Cancelled);
        }
        let (_, addr) = self.discover(prefix, nbits, cancel).await?;
        Ok(addr)
    }

    /// Close every constituent in order, even after a failure, and return
    /// the first failure.
    async fn close(&self) -> Result<(), NetworkError> {
        self.shutdown.cancel();
        let mut first_err = None;
        for constituent in &self.networks {
            if let Err(e) = constituent.network.close().await {
                error!(network = %constituent.name, error = %e, "failed to close network");
                if first_err.is_none() {
                    first_err = Some(NetworkError::ShutdownFailed {
                        network: constituent.name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
