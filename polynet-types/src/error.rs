use thiserror::Error;

/// Errors produced while parsing or validating shared types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid address length: expected {expected} bytes, got {actual}")]
    InvalidAddrLength { expected: usize, actual: usize },

    #[error("invalid hex: {reason}")]
    InvalidHex { reason: String },

    #[error("invalid prefix: {nbits} bits requested from a {len}-byte prefix")]
    InvalidPrefix { len: usize, nbits: usize },
}
