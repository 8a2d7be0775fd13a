use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{ADDR_BITS, ADDR_LEN};
use crate::error::TypesError;

/// Logical address of a node in the overlay.
///
/// Derived from the node's public key, so it stays the same no matter which
/// network or transport reaches the node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr([u8; ADDR_LEN]);

impl Addr {
    /// The all-zero address.
    pub const ZERO: Addr = Addr([0u8; ADDR_LEN]);

    pub const fn new(bytes: [u8; ADDR_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a slice that must be exactly `ADDR_LEN` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr: [u8; ADDR_LEN] = bytes
            .try_into()
            .map_err(|_| TypesError::InvalidAddrLength {
                expected: ADDR_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDR_LEN] {
        &self.0
    }

    /// True if the first `nbits` bits of this address equal those of `prefix`.
    ///
    /// Returns false when `nbits` does not fit in either the prefix or the
    /// address; use [`check_prefix`] to surface that as an error instead.
    pub fn has_prefix(&self, prefix: &[u8], nbits: usize) -> bool {
        if check_prefix(prefix, nbits).is_err() {
            return false;
        }
        let whole = nbits / 8;
        if self.0[..whole] != prefix[..whole] {
            return false;
        }
        let rem = nbits % 8;
        if rem == 0 {
            return true;
        }
        let mask = 0xffu8 << (8 - rem);
        (self.0[whole] ^ prefix[whole]) & mask == 0
    }
}

/// Validate a `(prefix, nbits)` pair used for address discovery.
pub fn check_prefix(prefix: &[u8], nbits: usize) -> Result<(), TypesError> {
    if nbits > prefix.len() * 8 || nbits > ADDR_BITS {
        return Err(TypesError::InvalidPrefix {
            len: prefix.len(),
            nbits,
        });
    }
    Ok(())
}

impl From<[u8; ADDR_LEN]> for Addr {
    fn from(bytes: [u8; ADDR_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Addr {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addr({})", hex::encode(&self.0[..8]))
    }
}

impl FromStr for Addr {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypesError::InvalidHex {
            reason: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }
}

// Addresses appear in config files, so they serialize as hex strings.
impl Serialize for Addr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Addr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
