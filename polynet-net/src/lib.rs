//! Network contract and multi-network routing for the polynet overlay.
//!
//! A [`Network`](network::Network) routes datagrams between logical
//! addresses. [`MultiNetwork`](multi::MultiNetwork) composes several of them
//! behind the same contract, discovering and caching which constituent owns
//! each destination.

pub mod discovery;
pub mod error;
pub mod factory;
pub mod loopback;
pub mod multi;
pub mod network;
pub mod peer_store;
pub mod swarm;

pub use error::{DiscoveryFailure, NetworkError};
pub use multi::MultiNetwork;
pub use network::{Network, RecvFn};
