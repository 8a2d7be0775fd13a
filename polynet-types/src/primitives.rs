/// 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Transport-level address of a peer, e.g. `udp://10.0.0.2:4242`.
///
/// Opaque to the routing layer; only the transport that produced it
/// knows how to interpret it.
pub type TransportAddr = String;
