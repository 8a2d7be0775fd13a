use std::fmt;

use polynet_types::{Addr, TypesError};
use thiserror::Error;

/// Errors that can occur in the routing layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// No network owns or can discover the address.
    #[error("address unreachable: {addr}")]
    AddrUnreachable { addr: Addr },

    /// A single network has no address matching the prefix.
    #[error("no address with prefix {prefix}/{nbits}")]
    PrefixNotFound { prefix: String, nbits: usize },

    /// Every network failed a discovery fan-out.
    #[error(transparent)]
    Discovery(#[from] DiscoveryFailure),

    /// Malformed address or prefix.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Payload exceeds the MTU for the destination.
    #[error("message too large: {size} bytes (mtu {mtu})")]
    MessageTooLarge { size: usize, mtu: usize },

    /// The owning network could not produce a public key.
    #[error("public key lookup failed for {addr}: {reason}")]
    LookupFailed { addr: Addr, reason: String },

    /// Failure reported by the underlying transport.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// A constituent network failed to release its resources.
    #[error("network {network} failed to close: {source}")]
    ShutdownFailed {
        network: String,
        #[source]
        source: Box<NetworkError>,
    },

    /// The network has been closed.
    #[error("network closed")]
    Closed,

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A spawned discovery task panicked or was aborted.
    #[error("network task failed: {reason}")]
    TaskFailed { reason: String },
}

impl NetworkError {
    /// True for errors meaning "nobody can reach this address".
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            NetworkError::AddrUnreachable { .. }
                | NetworkError::PrefixNotFound { .. }
                | NetworkError::Discovery(_)
        )
    }
}

/// One constituent's outcome in a failed discovery fan-out.
#[derive(Debug)]
pub struct DiscoveryAttempt {
    /// Name of the constituent network.
    pub network: String,
    pub error: NetworkError,
}

/// Aggregate of every constituent's failure during one discovery fan-out.
///
/// Holds exactly one attempt per constituent, in constituent order.
#[derive(Debug)]
pub struct DiscoveryFailure {
    pub prefix: Vec<u8>,
    pub nbits: usize,
    pub attempts: Vec<DiscoveryAttempt>,
}

impl DiscoveryFailure {
    /// Hex of the prefix bytes covered by `nbits`.
    pub fn prefix_hex(&self) -> String {
        let len = self.nbits.div_ceil(8).min(self.prefix.len());
        hex::encode(&self.prefix[..len])
    }
}

impl fmt::Display for DiscoveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discovery failed for {}/{} on {} network(s)",
            self.prefix_hex(),
            self.nbits,
            self.attempts.len()
        )?;
        for attempt in &self.attempts {
            write!(f, "; {}: {}", attempt.network, attempt.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for DiscoveryFailure {}
