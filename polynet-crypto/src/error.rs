use thiserror::Error;

/// Errors raised while handling key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid key material: {reason}")]
    InvalidKeyMaterial { reason: String },
}
