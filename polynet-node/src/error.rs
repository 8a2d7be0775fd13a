use polynet_net::NetworkError;
use thiserror::Error;

/// Errors that can occur in the node.
#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum NodeError {
    #[error("config error: {reason}")]
    ConfigError { reason: String },

    #[error("key error: {reason}")]
    KeyError { reason: String },

    #[error("unknown network '{name}'")]
    UnknownNetwork { name: String },

    #[error("network error: {0}")]
    NetworkError(#[from] NetworkError),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
