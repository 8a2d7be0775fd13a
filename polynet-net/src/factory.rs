use std::fmt;
use std::sync::Arc;

use crate::error::NetworkError;
use crate::network::Network;
use crate::peer_store::PeerStore;
use crate::swarm::SecureSwarm;

/// Everything a network needs at construction time.
#[derive(Clone)]
pub struct NetworkParams {
    pub swarm: Arc<dyn SecureSwarm>,
    pub peers: Arc<dyn PeerStore>,
}

/// Builds a network from its parameters.
pub type NetworkFactory =
    Arc<dyn Fn(NetworkParams) -> Result<Arc<dyn Network>, NetworkError> + Send + Sync>;

/// A named network factory, selected by name in the node config.
#[derive(Clone)]
pub struct NetworkSpec {
    pub name: String,
    pub factory: NetworkFactory,
}

impl NetworkSpec {
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(NetworkParams) -> Result<Arc<dyn Network>, NetworkError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Construct the network.
    pub fn build(&self, params: NetworkParams) -> Result<Arc<dyn Network>, NetworkError> {
        (self.factory)(params)
    }
}

impl fmt::Debug for NetworkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
