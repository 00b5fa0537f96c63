//! BLAKE3 helpers for artifact checksums and token feature hashing.

#[inline]
pub fn checksum(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Maps a token to a `(bucket, sign)` pair for signed feature hashing.
#[inline]
pub fn token_feature(token: &str, buckets: usize) -> (usize, f32) {
    let hash = blake3::hash(token.as_bytes());
    let bytes = hash.as_bytes();

    let mut index_bytes = [0u8; 8];
    index_bytes.copy_from_slice(&bytes[..8]);
    let bucket = (u64::from_le_bytes(index_bytes) % buckets.max(1) as u64) as usize;

    let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}
