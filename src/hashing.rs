//! String hashing shared by the variable environment and function groups.

/// Multiplier applied per byte position.
pub const HASH_PRIME: usize = 31;

/// Polynomial hash over the bytes of `key`: `sum(byte[i] * PRIME^i)`.
///
/// Arithmetic wraps, so long names never overflow. Callers reduce the result
/// modulo their bucket count.
#[inline]
pub fn hash_key(key: &str) -> usize {
    let mut base: usize = 1;
    let mut hash: usize = 0;

    for b in key.bytes() {
        hash = hash.wrapping_add(base.wrapping_mul(b as usize));
        base = base.wrapping_mul(HASH_PRIME);
    }

    hash
}

/// Bucket index of `key` in a table of `buckets` slots.
#[inline]
pub fn bucket_of(key: &str, buckets: usize) -> usize {
    hash_key(key) % buckets
}
