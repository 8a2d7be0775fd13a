use polynet_types::primitives::PublicKey;
use polynet_types::Addr;

/// Derive a logical address from a public key.
/// Addr = BLAKE3(pubkey)
pub fn pubkey_to_addr(pubkey: &PublicKey) -> Addr {
    Addr::new(*blake3::hash(pubkey).as_bytes())
}
