use std::collections::BTreeMap;

use polynet_net::factory::NetworkSpec;
use polynet_net::loopback::LoopbackNetwork;

use crate::error::NodeError;

/// Network specs the node can build, keyed by the name used in config.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    specs: BTreeMap<String, NetworkSpec>,
}

impl NetworkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of the networks shipped with the node.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(LoopbackNetwork::spec());
        registry
    }

    /// Add a spec, replacing any previous spec with the same name.
    pub fn register(&mut self, spec: NetworkSpec) -> Option<NetworkSpec> {
        self.specs.insert(spec.name.clone(), spec)
    }

    pub fn get(&self, name: &str) -> Result<&NetworkSpec, NodeError> {
        self.specs.get(name).ok_or_else(|| NodeError::UnknownNetwork {
            name: name.to_string(),
        })
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Check every name resolves, reporting the first that does not.
    pub fn validate<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Result<(), NodeError> {
        for name in names {
            self.get(name)?;
        }
        Ok(())
    }
}
