use xxhash_rust::xxh64::xxh64;

/// Seed used for every content fingerprint. Changing it invalidates all
/// previously recorded `text_hash` values.
pub const FINGERPRINT_SEED: u64 = 0;

/// Computes the 64-bit content fingerprint of raw request text.
///
/// XXH64 over the exact UTF-8 bytes with seed [`FINGERPRINT_SEED`]. The value
/// is stable across processes and platforms, so it works as a deduplication
/// and audit key. It is not a security primitive.
#[inline]
pub fn fingerprint(raw_text: &str) -> u64 {
    fingerprint_bytes(raw_text.as_bytes())
}

#[inline]
pub fn fingerprint_bytes(data: &[u8]) -> u64 {
    xxh64(data, FINGERPRINT_SEED)
}
