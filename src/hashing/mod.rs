//! BLAKE3-derived seeds.

/// Computes a 64-bit value from the first 8 bytes of the BLAKE3 hash of `data`.
///
/// Used to seed deterministic stub embeddings. Not a content identifier:
/// with 64 bits, collisions become likely around 4 billion distinct inputs.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
