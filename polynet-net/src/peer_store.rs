use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use polynet_types::primitives::TransportAddr;
use polynet_types::Addr;

/// Read-only view of known peers, consumed by networks at construction.
pub trait PeerStore: Send + Sync {
    /// Addresses of all known peers.
    fn list_peers(&self) -> Vec<Addr>;

    /// Transport addresses known for `peer`, empty if the peer is unknown.
    fn list_addrs(&self, peer: &Addr) -> Vec<TransportAddr>;
}

/// In-memory peer store, populated from configuration.
///
/// Iteration order is by address so listings are stable.
pub struct MemPeerStore {
    peers: RwLock<BTreeMap<Addr, Vec<TransportAddr>>>,
}

impl MemPeerStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add a peer with no transport addresses. Returns false if already known.
    pub fn add(&self, peer: Addr) -> bool {
        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
        if peers.contains_key(&peer) {
            return false;
        }
        peers.insert(peer, Vec::new());
        true
    }

    /// Replace the transport addresses of a known peer.
    /// Returns false if the peer has not been added.
    pub fn set_addrs(&self, peer: &Addr, addrs: Vec<TransportAddr>) -> bool {
        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
        match peers.get_mut(peer) {
            Some(slot) => {
                *slot = addrs;
                true
            }
            None => false,
        }
    }

    /// Remove a peer and its addresses. Returns false if it was unknown.
    pub fn remove(&self, peer: &Addr) -> bool {
        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
        peers.remove(peer).is_some()
    }

    pub fn contains(&self, peer: &Addr) -> bool {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        peers.contains_key(peer)
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemPeerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerStore for MemPeerStore {
    fn list_peers(&self) -> Vec<Addr> {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        peers.keys().copied().collect()
    }

    fn list_addrs(&self, peer: &Addr) -> Vec<TransportAddr> {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        peers.get(peer).cloned().unwrap_or_default()
    }
}
