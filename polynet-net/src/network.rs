use std::sync::Arc;

use async_trait::async_trait;
use polynet_types::primitives::PublicKey;
use polynet_types::Addr;
use tokio_util::sync::CancellationToken;

use crate::error::NetworkError;

/// Callback invoked for every inbound datagram as `(src, dst, payload)`.
pub type RecvFn = Arc<dyn Fn(&Addr, &Addr, &[u8]) + Send + Sync>;

/// A receive callback that drops everything.
pub fn noop_recv() -> RecvFn {
    Arc::new(|_: &Addr, _: &Addr, _: &[u8]| {})
}

/// An addressing/routing scheme that moves datagrams between logical
/// addresses.
///
/// Implementations must be safe for concurrent use: the multi-network issues
/// overlapping calls against the same instance without extra locking.
#[async_trait]
pub trait Network: Send + Sync {
    /// Hand `data` to the transport for delivery to `dst`. No delivery
    /// acknowledgement is implied.
    async fn tell(&self, dst: &Addr, data: &[u8]) -> Result<(), NetworkError>;

    /// Install the inbound callback, replacing any previous one.
    fn on_recv(&self, f: RecvFn);

    /// Largest payload `tell` accepts for `target`.
    async fn mtu(&self, target: &Addr) -> Result<usize, NetworkError>;

    /// Public key bound to `target`.
    async fn lookup_public_key(&self, target: &Addr) -> Result<PublicKey, NetworkError>;

    /// Find some reachable address whose first `nbits` bits equal `prefix`.
    ///
    /// `cancel` is advisory: implementations that can abandon work early
    /// should watch it and return [`NetworkError::Cancelled`].
    async fn find_addr(
        &self,
        prefix: &[u8],
        nbits: usize,
        cancel: &CancellationToken,
    ) -> Result<Addr, NetworkError>;

    /// Release resources held by this network.
    async fn close(&self) -> Result<(), NetworkError>;
}
