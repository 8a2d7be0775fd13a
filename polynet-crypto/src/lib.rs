pub mod address;
pub mod error;
pub mod keys;

pub use error::CryptoError;
