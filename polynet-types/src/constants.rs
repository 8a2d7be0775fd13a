// ─── Addressing ──────────────────────────────────────────────────────────────

/// Length of a logical address in bytes.
pub const ADDR_LEN: usize = 32;

/// Length of a logical address in bits.
pub const ADDR_BITS: usize = ADDR_LEN * 8;

// ─── Datagrams ───────────────────────────────────────────────────────────────

/// Payload limit used by networks that have no transport-imposed bound.
pub const DEFAULT_MTU: usize = 1 << 15;
