//! Shared type definitions for the polynet overlay: logical addresses,
//! key aliases, and protocol-wide constants.

pub mod addr;
pub mod constants;
pub mod error;
pub mod primitives;

pub use addr::Addr;
pub use error::TypesError;
