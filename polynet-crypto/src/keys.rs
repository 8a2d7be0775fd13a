use polynet_types::primitives::PublicKey;
use polynet_types::Addr;

use crate::address::pubkey_to_addr;
use crate::error::CryptoError;

/// Node identity: an Ed25519 signing key.
pub struct Keypair {
    inner: ed25519_dalek::SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { inner: signing_key }
    }

    /// Create a keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { inner: signing_key }
    }

    /// Parse a hex-encoded 32-byte seed, as stored in key files.
    /// Surrounding whitespace is ignored.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(text.trim()).map_err(|e| CryptoError::InvalidKeyMaterial {
            reason: e.to_string(),
        })?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyMaterial {
                reason: format!("expected 32-byte seed, got {} bytes", bytes.len()),
            })?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex encoding of the seed, the inverse of [`Keypair::from_hex`].
    pub fn to_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    /// Get the public key bytes.
    pub fn public_key(&self) -> PublicKey {
        self.inner.verifying_key().to_bytes()
    }

    /// The logical address this key owns.
    pub fn addr(&self) -> Addr {
        pubkey_to_addr(&self.public_key())
    }
}

// SigningKey with the "zeroize" feature wipes key material on drop.
